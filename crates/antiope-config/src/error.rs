use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown variable: ${0}")]
    UnknownVariable(String),

    #[error("unterminated variable reference in {0:?}")]
    UnterminatedVariable(String),

    #[error("invalid value for {option}: {value}")]
    InvalidValue { option: String, value: String },
}
