//! Building the tower for a declaration, and resolving type names in it.

use crate::tower::{ScopeEntry, TowerContext, TowerLevel, TowerLevelKind};
use lres_fir::builder::visible_type_parameters;
use lres_fir::{
    BuiltinType, ConeType, DeclId, DeclKind, Declaration, FirFile, FirSession, ImportTarget,
    TypeRef,
};
use tracing::trace;

/// Tower visible in the header and at the start of the body of `decl`.
///
/// `containers` are the enclosing classes, outermost first. Members of a
/// container are visible only when every class between it and `decl` is
/// `inner` or local; nested class names are always visible.
pub fn build_tower(
    session: &FirSession,
    file: &FirFile,
    containers: &[DeclId],
    decl: &Declaration,
) -> TowerContext {
    let mut tower = TowerContext::new();

    let mut defaults = TowerLevel::new(TowerLevelKind::DefaultImports);
    for builtin in BuiltinType::ALL {
        defaults.add_type(builtin.name(), ScopeEntry::new(None, Some(ConeType::Builtin(builtin))));
    }
    tower.push(defaults);

    let mut imports = TowerLevel::new(TowerLevelKind::ExplicitImports);
    for import in &file.imports {
        if let (Some(ImportTarget::Class { fq_name }), Some(name)) =
            (&import.resolved, import.imported_name())
        {
            imports.add_type(name, ScopeEntry::new(None, Some(ConeType::class(fq_name.clone()))));
        }
    }
    tower.push(imports);

    let mut file_level = TowerLevel::new(TowerLevelKind::File);
    add_members(session, file, &file.declarations, &mut file_level, true);
    tower.push(file_level);

    for (i, &container) in containers.iter().enumerate() {
        let Some(class) = file.decl(container) else {
            continue;
        };
        let values_visible = containers[i + 1..]
            .iter()
            .filter_map(|&c| file.decl(c))
            .chain(std::iter::once(decl).filter(|d| d.kind == DeclKind::Class))
            .all(|d| d.is_inner() || d.is_local());
        let mut level = TowerLevel::new(TowerLevelKind::Class {
            name: class.name.clone(),
        });
        add_members(session, file, class.members(), &mut level, values_visible);
        tower.push(level);
    }

    let mut type_parameters = TowerLevel::new(TowerLevelKind::TypeParameters);
    for parameter in visible_type_parameters(decl) {
        let ty = ConeType::TypeParameter {
            name: parameter.name.clone(),
            symbol: parameter.symbol,
        };
        type_parameters.add_type(parameter.name, ScopeEntry::new(Some(parameter.symbol), Some(ty)));
    }
    tower.push(type_parameters);

    tower
}

/// Add the names `ids` declare to `level`.
pub fn add_members(
    session: &FirSession,
    file: &FirFile,
    ids: &[DeclId],
    level: &mut TowerLevel,
    with_values: bool,
) {
    for &id in ids {
        let Some(member) = file.decl(id) else {
            continue;
        };
        match member.kind {
            DeclKind::Class => {
                let ty = member.as_class().map(|c| c.self_type.clone());
                level.add_type(member.name.clone(), ScopeEntry::new(Some(member.symbol), ty));
            }
            DeclKind::TypeAlias => {
                let ty = member
                    .return_type()
                    .and_then(|t| declared_type(session, file, t));
                level.add_type(member.name.clone(), ScopeEntry::new(Some(member.symbol), ty));
            }
            DeclKind::Function | DeclKind::Property if with_values => {
                let ty = member
                    .return_type()
                    .and_then(|t| declared_type(session, file, t));
                level.add_value(member.name.clone(), ScopeEntry::new(Some(member.symbol), ty));
            }
            DeclKind::Function | DeclKind::Property => {}
        }
    }
}

/// Best-effort type of a declaration seen from elsewhere, without resolving
/// it: the resolved type if there is one, or a builtin or file class named
/// by an explicit unresolved reference.
fn declared_type(session: &FirSession, file: &FirFile, ty: &TypeRef) -> Option<ConeType> {
    match ty {
        TypeRef::Resolved { ty, .. } | TypeRef::Inferred(ty) => Some(ty.clone()),
        TypeRef::Unresolved { name, .. } => session.builtin(name).or_else(|| {
            let fq_name = qualify(&file.package, name);
            file.class_fq_names()
                .contains(&fq_name)
                .then(|| ConeType::class(fq_name))
        }),
        TypeRef::Implicit => None,
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

/// Resolve a type name as written at a point where `tower` is visible.
///
/// Looks through the tower first, then qualified names, the file's own
/// package, star imports and default imports.
pub fn resolve_type_name(
    session: &FirSession,
    file: &FirFile,
    tower: &TowerContext,
    name: &str,
) -> Option<ConeType> {
    if let Some(ty) = tower.lookup_type(name).and_then(|e| e.ty.clone()) {
        return Some(ty);
    }
    if name.contains('.') {
        if file.class_fq_names().iter().any(|n| n == name) || session.provider().has_class(name) {
            return Some(ConeType::class(name));
        }
        return None;
    }
    if let Some(ty) = session.class_in_package(&file.package, name) {
        return Some(ty);
    }
    let star_packages = file.imports.iter().filter_map(|i| match &i.resolved {
        Some(ImportTarget::Package(package)) => Some(package.as_str()),
        _ => None,
    });
    for package in star_packages.chain(session.options.default_imports.iter().map(String::as_str)) {
        if let Some(ty) = session.class_in_package(package, name) {
            return Some(ty);
        }
    }
    trace!(name, "type name not found");
    None
}
