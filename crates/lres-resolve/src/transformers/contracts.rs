use super::{PhaseTransformer, TransformContext, range_of};
use lres_common::{DiagnosticKind, ResolveDiagnostic};
use lres_fir::{
    ContractDescription, ContractEffect, DeclId, RawContractEffect, ResolveError, ResolvePhase,
    ValueParameter,
};

/// Turns raw contract effects into resolved ones. Parameter names become
/// indices into the function's value parameters.
pub struct ContractsTransformer;

impl PhaseTransformer for ContractsTransformer {
    fn phase(&self) -> ResolvePhase {
        ResolvePhase::Contracts
    }

    fn transform(&self, cx: &mut TransformContext<'_>, id: DeclId) -> Result<(), ResolveError> {
        let decl = cx.decl(id)?;
        let Some(function) = decl.as_function() else {
            return Ok(());
        };
        let Some(ContractDescription::Raw(raw)) = &function.contract else {
            return Ok(());
        };

        let mut effects = Vec::with_capacity(raw.len());
        let mut diagnostics = Vec::new();
        for effect in raw {
            match resolve_effect(effect, &function.value_parameters) {
                Ok(resolved) => effects.push(resolved),
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        cx.file.arena.update(id, |d| {
            if let Some(function) = d.as_function_mut() {
                function.contract = Some(ContractDescription::Resolved(effects));
            }
            for diagnostic in diagnostics {
                d.report(diagnostic);
            }
        });
        Ok(())
    }
}

fn resolve_effect(
    effect: &RawContractEffect,
    parameters: &[ValueParameter],
) -> Result<ContractEffect, ResolveDiagnostic> {
    let parameter_index = || {
        let name = effect.parameter.as_deref().unwrap_or_default();
        parameters
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| {
                ResolveDiagnostic::new(
                    DiagnosticKind::UnresolvedContractParameter,
                    format!("Contract effect '{}' names no parameter '{name}'", effect.effect),
                    range_of(effect.source.as_ref()),
                )
            })
    };
    match effect.effect.as_str() {
        "returns" => Ok(ContractEffect::Returns),
        "returnsNotNull" => Ok(ContractEffect::ReturnsNotNull),
        "callsInPlace" => Ok(ContractEffect::CallsInPlace {
            parameter: parameter_index()?,
        }),
        "returnsImplies" => Ok(ContractEffect::ReturnsImplies {
            parameter: parameter_index()?,
        }),
        other => Err(ResolveDiagnostic::new(
            DiagnosticKind::UnknownContractEffect,
            format!("Unknown contract effect '{other}'"),
            range_of(effect.source.as_ref()),
        )),
    }
}
