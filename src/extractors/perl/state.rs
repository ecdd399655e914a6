/// Parse state shared by the recognizer rules
///
/// Rules communicate only through this struct. Rule 11 (imports) toggles the
/// framework markers that gate rules 6, 9 and 13, so imports must be seen
/// before the declarations they enable.
use std::collections::HashSet;

/// Object systems and syntax extensions that change what a line means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Framework {
    /// Moose, Moo, Mouse and friends: enables `has name`
    MooseFamily,
    /// Enables `field $x` and `has $x`
    ObjectPad,
    /// `use feature 'class'`: enables `field $x`
    FeatureClass,
    /// Enables `func`/`fun` declarations
    FunctionParameters,
    /// Dancer, Dancer2, Mojolicious::Lite: enables route recognition
    WebFramework,
}

/// What the next line continues, if anything
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Continuation {
    #[default]
    None,
    /// A `my (...)` list that has not closed yet
    Variables,
    /// A sub parameter list that has not closed yet
    Signature { name: String, index: usize },
    /// A `use constant { ... }` block that has not closed yet
    ConstantBlock,
}

#[derive(Debug, Default)]
pub(crate) struct ParseState {
    pub current_package: String,
    pub continuation: Continuation,
    frameworks: HashSet<Framework>,
}

impl ParseState {
    pub fn activate(&mut self, framework: Framework) {
        self.frameworks.insert(framework);
    }

    pub fn is_active(&self, framework: Framework) -> bool {
        self.frameworks.contains(&framework)
    }

    /// Key under which parents are registered: the package, or `main`
    pub fn package_or_main(&self) -> &str {
        if self.current_package.is_empty() {
            "main"
        } else {
            &self.current_package
        }
    }
}
