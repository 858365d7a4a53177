//! Stable problem codes for the Cool semantic analyzer.
//!
//! Each problem has a code that users know it as. The codes should remain
//! stable between releases to facilitate consistent documentation. The
//! internal names make for easy reading, but we don't promise that those
//! remain consistent between releases.

/// The set of problems this analyzer can report.
pub enum Problem {
    // Serialized tree reading
    SyntaxError,

    // Structural inheritance
    SelfTypeRedefined,
    BasicClassInheritance,
    ClassMultiplyDefined,
    ClassInheritsFromSelf,
    InheritanceCycle,
    ParentNotDefined,
    MainNotDefined,

    // Feature declarations
    MethodMultiplyDefined,
    FormalMultiplyDefined,
    FormalNamedSelf,
    FormalSelfTypeParameter,
    MainMethodSignature,
    OverrideMismatch,
    AttributeMultiplyDefined,
    AttributeNamedSelf,
    AttributeInitTypeMismatch,
    MethodBodyTypeMismatch,

    // Expressions
    UnboundIdentifier,
    AssignTypeMismatch,
    ArithmeticTypeMismatch,
    NegationTypeMismatch,
    ComplementTypeMismatch,
    EqualityBasicTypeMismatch,
    PredicateNotBool,
    LetSelfBinding,
    LetInitTypeMismatch,
    CaseSelfBinding,
    CaseDuplicateBranchType,
    DispatchUndefinedMethod,
    DispatchWrongArgumentCount,
    DispatchArgumentTypeMismatch,
    StaticDispatchSelfType,
    StaticDispatchTypeMismatch,
}

impl Problem {
    /// Returns the code for the particular problem as a string.
    pub fn code(&self) -> &'static str {
        match self {
            Problem::SyntaxError => "P0001",
            Problem::SelfTypeRedefined => "S001",
            Problem::BasicClassInheritance => "S002",
            Problem::ClassMultiplyDefined => "S003",
            Problem::ClassInheritsFromSelf => "S004",
            Problem::InheritanceCycle => "S005",
            Problem::ParentNotDefined => "S006",
            Problem::MainNotDefined => "S007",
            Problem::MethodMultiplyDefined => "S010",
            Problem::FormalMultiplyDefined => "S011",
            Problem::FormalNamedSelf => "S012",
            Problem::FormalSelfTypeParameter => "S013",
            Problem::MainMethodSignature => "S014",
            Problem::OverrideMismatch => "S020",
            Problem::AttributeMultiplyDefined => "S021",
            Problem::AttributeNamedSelf => "S022",
            Problem::AttributeInitTypeMismatch => "S023",
            Problem::MethodBodyTypeMismatch => "S024",
            Problem::UnboundIdentifier => "S030",
            Problem::AssignTypeMismatch => "S031",
            Problem::ArithmeticTypeMismatch => "S032",
            Problem::NegationTypeMismatch => "S033",
            Problem::ComplementTypeMismatch => "S034",
            Problem::EqualityBasicTypeMismatch => "S035",
            Problem::PredicateNotBool => "S036",
            Problem::LetSelfBinding => "S037",
            Problem::LetInitTypeMismatch => "S038",
            Problem::CaseSelfBinding => "S039",
            Problem::CaseDuplicateBranchType => "S040",
            Problem::DispatchUndefinedMethod => "S041",
            Problem::DispatchWrongArgumentCount => "S042",
            Problem::DispatchArgumentTypeMismatch => "S043",
            Problem::StaticDispatchSelfType => "S044",
            Problem::StaticDispatchTypeMismatch => "S045",
        }
    }

    /// Returns the generic description of the problem category. The
    /// description is constant and does not depend on the particular
    /// instance of the problem.
    pub fn message(&self) -> &'static str {
        match self {
            Problem::SyntaxError => "Serialized tree is not syntactically valid",
            Problem::SelfTypeRedefined => "SELF_TYPE cannot be redefined",
            Problem::BasicClassInheritance => "Class inherits from a basic class",
            Problem::ClassMultiplyDefined => "Class is defined more than once",
            Problem::ClassInheritsFromSelf => "Class inherits from itself",
            Problem::InheritanceCycle => "Inheritance graph contains a cycle",
            Problem::ParentNotDefined => "Parent class is not defined",
            Problem::MainNotDefined => "Class Main is not defined",
            Problem::MethodMultiplyDefined => "Method is defined more than once in a class",
            Problem::FormalMultiplyDefined => "Formal parameter is defined more than once",
            Problem::FormalNamedSelf => "Formal parameter is named self",
            Problem::FormalSelfTypeParameter => "Formal parameter has type SELF_TYPE",
            Problem::MainMethodSignature => "Main class lacks a zero-argument main method",
            Problem::OverrideMismatch => "Method override does not match the inherited signature",
            Problem::AttributeMultiplyDefined => "Attribute is defined more than once in a hierarchy",
            Problem::AttributeNamedSelf => "Attribute is named self",
            Problem::AttributeInitTypeMismatch => "Attribute initializer does not conform to the declared type",
            Problem::MethodBodyTypeMismatch => "Method body does not conform to the return type",
            Problem::UnboundIdentifier => "Identifier is not bound in this scope",
            Problem::AssignTypeMismatch => "Assigned value does not conform to the identifier type",
            Problem::ArithmeticTypeMismatch => "Arithmetic or comparison on non-Int operands",
            Problem::NegationTypeMismatch => "Negation of a non-Int operand",
            Problem::ComplementTypeMismatch => "Complement of a non-Bool operand",
            Problem::EqualityBasicTypeMismatch => "Equality between incompatible basic types",
            Problem::PredicateNotBool => "Predicate is not of type Bool",
            Problem::LetSelfBinding => "Let binds the name self",
            Problem::LetInitTypeMismatch => "Let initializer does not conform to the declared type",
            Problem::CaseSelfBinding => "Case branch binds the name self",
            Problem::CaseDuplicateBranchType => "Case branches declare a duplicate type",
            Problem::DispatchUndefinedMethod => "Dispatch to an undefined method",
            Problem::DispatchWrongArgumentCount => "Dispatch with the wrong number of arguments",
            Problem::DispatchArgumentTypeMismatch => "Dispatch argument does not conform to the formal type",
            Problem::StaticDispatchSelfType => "Static dispatch through SELF_TYPE",
            Problem::StaticDispatchTypeMismatch => "Receiver does not conform to the static dispatch type",
        }
    }
}
