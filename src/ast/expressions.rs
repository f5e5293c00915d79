use crate::ast::Comparator;
use crate::value::Value;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// The AST is the internal representation of a query after parsing.
/// Projections carry their own right-hand side so that the evaluator can
/// apply it element-wise; a pipe ends every projection to its left.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // References
    /// Field lookup on the current object
    ///
    /// # Example
    /// ```text
    /// people
    /// "quoted field"
    /// ```
    Identifier(String),

    /// The current node (`@`)
    CurrentNode,

    /// The document the evaluation started from (`$`)
    Root,

    /// Variable reference (`$name`)
    ///
    /// Resolved against `let` scopes, innermost first, then session
    /// parameters.
    VariableRef(String),

    // Literals
    /// JSON literal
    ///
    /// # Example
    /// ```text
    /// `20`
    /// `"text"`
    /// ```
    Literal(Value),

    /// Raw string literal
    ///
    /// # Example
    /// ```text
    /// 'foo'
    /// ```
    RawString(String),

    // Access
    /// Array index, negative counts from the end
    ///
    /// # Example
    /// ```text
    /// [0]
    /// [-1]
    /// ```
    Index(i64),

    /// Array slice; a slice on a left-hand side parses as a projection over
    /// this node
    ///
    /// # Example
    /// ```text
    /// [1:3]
    /// [::-1]
    /// ```
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },

    /// Evaluate `rhs` against the result of `lhs`
    ///
    /// # Example
    /// ```text
    /// foo.bar
    /// foo[0]
    /// ```
    Subexpression { lhs: Box<Expr>, rhs: Box<Expr> },

    // Projections
    /// Array projection (`[*]`, slices)
    ///
    /// # Example
    /// ```text
    /// people[*].name
    /// ```
    WildcardArray { lhs: Box<Expr>, rhs: Box<Expr> },

    /// Object value projection (`*`)
    ///
    /// # Example
    /// ```text
    /// ops.*.numArgs
    /// ```
    WildcardObject { lhs: Box<Expr>, rhs: Box<Expr> },

    /// Flatten one level, then project
    ///
    /// # Example
    /// ```text
    /// reservations[].instances[]
    /// ```
    Flatten { lhs: Box<Expr>, rhs: Box<Expr> },

    /// Filter projection
    ///
    /// # Example
    /// ```text
    /// people[?age > `20`].name
    /// ```
    Filter {
        lhs: Box<Expr>,
        predicate: Box<Expr>,
        rhs: Box<Expr>,
    },

    // Operations
    /// Pipe; stops projections
    ///
    /// # Example
    /// ```text
    /// people[*].name | [0]
    /// ```
    Pipe { lhs: Box<Expr>, rhs: Box<Expr> },

    /// `||`, yields the first truthy operand
    Or { lhs: Box<Expr>, rhs: Box<Expr> },

    /// `&&`, yields the first falsy operand
    And { lhs: Box<Expr>, rhs: Box<Expr> },

    /// `!`, always yields a boolean
    Not(Box<Expr>),

    /// Comparison
    Comparison {
        op: Comparator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    // Constructors
    /// Multi-select list
    ///
    /// # Example
    /// ```text
    /// [name, age]
    /// ```
    MultiSelectList(Vec<Expr>),

    /// Multi-select hash, keys in source order
    ///
    /// # Example
    /// ```text
    /// {name: name, years: age}
    /// ```
    MultiSelectHash(Vec<(String, Expr)>),

    // Functions
    /// Function call
    ///
    /// # Example
    /// ```text
    /// length(people)
    /// sort_by(people, &age)
    /// ```
    FunctionCall { name: String, args: Vec<Expr> },

    /// Expression reference (`&expr`), only valid as a function argument
    ExpressionRef(Box<Expr>),

    // Scoping
    /// `let $a = e1, $b = e2 in body`
    ///
    /// Bindings are evaluated in order against the current value; later
    /// bindings see earlier ones.
    LetExpression {
        bindings: Vec<(String, Expr)>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub(crate) fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }
}
