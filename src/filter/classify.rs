use crate::{
    ast::Token,
    builtins,
    expression::GuestExpression,
    filter::grammar,
    lexer::Lexer,
};

/// Why a predicate stays local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Calls a local-only built-in function.
    BuiltinCall(String),
    /// Calls a function the filter grammar does not know.
    UnsupportedFunction(String),
    /// Uses the bound parameter other than as `param.property`.
    BareParameter(String),
    /// Reads a nested property or a property of a computed value.
    NestedProperty(String),
    /// Property name collides with a keyword of the filter grammar.
    ReservedName(String),
    /// Binds more than one parameter.
    ParameterCount(usize),
    /// Body could not be tokenized.
    Unlexable(String),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::BuiltinCall(name) => write!(f, "calls built-in function {name}()"),
            Rejection::UnsupportedFunction(name) => {
                write!(f, "calls {name}(), which the filter grammar does not support")
            }
            Rejection::BareParameter(name) => {
                write!(f, "uses parameter '{name}' without a property")
            }
            Rejection::NestedProperty(name) => write!(f, "reads nested property '{name}'"),
            Rejection::ReservedName(name) => {
                write!(f, "property '{name}' is a filter keyword")
            }
            Rejection::ParameterCount(n) => write!(f, "binds {n} parameters"),
            Rejection::Unlexable(e) => write!(f, "cannot be tokenized: {e}"),
        }
    }
}

/// Outcome of classifying a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The predicate can be compiled and pushed to the remote store.
    Remote,
    /// The predicate must be evaluated in the residual pass.
    Local(Rejection),
}

impl Eligibility {
    pub fn is_remote(&self) -> bool {
        matches!(self, Eligibility::Remote)
    }
}

/// True when `expr` can be pushed down.
pub fn is_remote_eligible(expr: &GuestExpression) -> bool {
    classify(expr).is_remote()
}

/// Scans the predicate body token by token.
///
/// Any call to a built-in makes the whole predicate local, wherever the call
/// sits; so does a call to anything the filter grammar cannot execute. The
/// bound parameter may only appear as `param.property`.
pub fn classify(expr: &GuestExpression) -> Eligibility {
    if expr.params().len() != 1 {
        return Eligibility::Local(Rejection::ParameterCount(expr.params().len()));
    }

    let tokens = match Lexer::new(expr.body_source()).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => return Eligibility::Local(Rejection::Unlexable(e.to_string())),
    };

    for (i, token) in tokens.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
        let next = tokens.get(i + 1);

        match token {
            Token::Identifier(name)
                if next == Some(&Token::LParen) && builtins::is_builtin(name) =>
            {
                return Eligibility::Local(Rejection::BuiltinCall(name.clone()));
            }
            Token::Identifier(name)
                if next == Some(&Token::LParen) && !builtins::is_remote_native(name) =>
            {
                return Eligibility::Local(Rejection::UnsupportedFunction(name.clone()));
            }
            Token::Identifier(name) if expr.binds(name) && prev != Some(&Token::Dot) => {
                if next != Some(&Token::Dot) {
                    return Eligibility::Local(Rejection::BareParameter(name.clone()));
                }
            }
            Token::Identifier(name) if prev != Some(&Token::Dot) && grammar::is_reserved(name) => {
                return Eligibility::Local(Rejection::ReservedName(name.clone()));
            }
            Token::Dot => {
                let after_param =
                    matches!(prev, Some(Token::Identifier(p)) if expr.binds(p))
                        && (i < 2 || tokens[i - 2] != Token::Dot);
                let property = match next {
                    Some(Token::Identifier(name)) => name.clone(),
                    _ => String::from("."),
                };
                if !after_param {
                    return Eligibility::Local(Rejection::NestedProperty(property));
                }
                if grammar::is_reserved(&property) {
                    return Eligibility::Local(Rejection::ReservedName(property));
                }
            }
            _ => {}
        }
    }

    Eligibility::Remote
}
