//! State the builders carry while walking down a file.

use crate::declarations::TypeParameterRef;
use crate::symbols::SymbolId;
use crate::types::ConeType;

/// What a class entry changed, so the walk can undo it on the way out.
#[derive(Debug)]
pub struct ClassFrame {
    saved_captured: Vec<TypeParameterRef>,
    /// Outer type parameters the class itself captures.
    pub captured: Vec<TypeParameterRef>,
    pub self_type: ConeType,
}

#[derive(Clone, Debug)]
struct FunctionFrame {
    label: Option<String>,
    symbol: SymbolId,
}

#[derive(Debug, Default)]
pub struct BuilderContext {
    package: String,
    class_names: Vec<String>,
    captured: Vec<TypeParameterRef>,
    self_types: Vec<ConeType>,
    functions: Vec<FunctionFrame>,
    body_depth: usize,
}

impl BuilderContext {
    pub fn new(package: impl Into<String>) -> BuilderContext {
        BuilderContext {
            package: package.into(),
            ..BuilderContext::default()
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Register a class on the way down.
    ///
    /// A class that does not capture (neither `inner` nor local) starts from
    /// an empty set of outer type parameters. Its own parameters are then
    /// visible to everything nested in it.
    pub fn enter_class(
        &mut self,
        name: &str,
        captures_outer: bool,
        own_type_parameters: Vec<TypeParameterRef>,
    ) -> ClassFrame {
        let self_type = ConeType::class(self.qualified_name(name));
        self.class_names.push(name.to_string());

        let saved_captured = self.captured.clone();
        if !captures_outer {
            self.captured.clear();
        }
        let captured = self.captured.clone();
        self.captured.extend(own_type_parameters);
        self.self_types.push(self_type.clone());

        ClassFrame {
            saved_captured,
            captured,
            self_type,
        }
    }

    pub fn exit_class(&mut self, frame: ClassFrame) {
        self.class_names.pop();
        self.self_types.pop();
        self.captured = frame.saved_captured;
    }

    /// `package.Outer.name`, or just `name` inside a body.
    pub fn qualified_name(&self, name: &str) -> String {
        if self.body_depth > 0 {
            return name.to_string();
        }
        let mut parts: Vec<&str> = Vec::with_capacity(self.class_names.len() + 2);
        if !self.package.is_empty() {
            parts.push(&self.package);
        }
        parts.extend(self.class_names.iter().map(String::as_str));
        parts.push(name);
        parts.join(".")
    }

    pub fn captured_type_parameters(&self) -> &[TypeParameterRef] {
        &self.captured
    }

    /// Self type of the innermost class, the dispatch receiver of its members.
    pub fn current_self_type(&self) -> Option<&ConeType> {
        self.self_types.last()
    }

    pub fn in_body(&self) -> bool {
        self.body_depth > 0
    }

    pub fn enter_body(&mut self, label: Option<&str>, symbol: SymbolId) {
        self.functions.push(FunctionFrame {
            label: label.map(str::to_string),
            symbol,
        });
        self.body_depth += 1;
    }

    pub fn exit_body(&mut self) {
        self.functions.pop();
        self.body_depth = self.body_depth.saturating_sub(1);
    }

    /// Target of a `return`: the innermost function, or the innermost one
    /// whose label matches.
    pub fn bind_return(&self, label: Option<&str>) -> Option<SymbolId> {
        match label {
            None => self.functions.last().map(|f| f.symbol),
            Some(label) => self
                .functions
                .iter()
                .rev()
                .find(|f| f.label.as_deref() == Some(label))
                .map(|f| f.symbol),
        }
    }
}
