//! 입력 확정 전 검증.

use thiserror::Error;

use crate::domain::cmd::{CommandTree, LookupError};
use crate::domain::state::SessionState;

/// 검증 실패. `cursor`는 문제 위치(바이트 오프셋)이다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub cursor: usize,
}

pub trait Validate {
    fn validate(&self, input: &str) -> Result<(), ValidationError>;
}

/// 현재 컨텍스트의 명령 트리 기준으로 입력을 검증한다.
/// 빈 입력은 항상 통과한다.
pub struct CommandValidator<'a> {
    tree: &'a CommandTree,
    state: &'a SessionState,
}

impl<'a> CommandValidator<'a> {
    pub fn new(tree: &'a CommandTree, state: &'a SessionState) -> Self {
        Self { tree, state }
    }
}

impl Validate for CommandValidator<'_> {
    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        if input.trim().is_empty() {
            return Ok(());
        }

        match self.tree.lookup(input, self.state) {
            Ok(_) => Ok(()),
            Err(err) => {
                let cursor = match &err {
                    LookupError::Syntax(syntax) => syntax.offset(),
                    _ => input.len(),
                };
                Err(ValidationError {
                    message: err.to_string(),
                    cursor,
                })
            }
        }
    }
}

/// 임의의 조건 함수를 검증기로 감싼다.
pub struct PredicateValidator<F> {
    predicate: F,
    message: String,
}

impl<F> PredicateValidator<F>
where
    F: Fn(&str) -> bool,
{
    pub fn new(predicate: F, message: &str) -> Self {
        Self {
            predicate,
            message: message.to_string(),
        }
    }
}

impl<F> Validate for PredicateValidator<F>
where
    F: Fn(&str) -> bool,
{
    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        if (self.predicate)(input) {
            Ok(())
        } else {
            Err(ValidationError {
                message: self.message.clone(),
                cursor: input.len(),
            })
        }
    }
}

/// 모든 검증기를 순서대로 적용하고 첫 실패를 돌려준다.
pub struct AllOf<'a> {
    validators: Vec<&'a dyn Validate>,
}

impl<'a> AllOf<'a> {
    pub fn new(validators: Vec<&'a dyn Validate>) -> Self {
        Self { validators }
    }
}

impl Validate for AllOf<'_> {
    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.validate(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::argparser::ArgSpec;
    use crate::domain::cmd::Command;
    use crate::domain::state::StateId;

    fn tree() -> CommandTree {
        CommandTree::new()
            .with_command(Command::new("say", |_| Ok(())).args(ArgSpec::new().required("text")))
            .unwrap()
            .with_command(
                Command::new("secret", |_| Ok(())).available_when(|s| s.contains("unlocked")),
            )
            .unwrap()
            .with_group(
                "net",
                CommandTree::new()
                    .with_command(Command::new("ping", |_| Ok(())))
                    .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn blank_input_is_valid() {
        let tree = tree();
        let state = SessionState::new(StateId::ROOT);
        let v = CommandValidator::new(&tree, &state);
        assert!(v.validate("").is_ok());
        assert!(v.validate("   ").is_ok());
    }

    #[test]
    fn rejects_unknown_and_incomplete() {
        let tree = tree();
        let state = SessionState::new(StateId::ROOT);
        let v = CommandValidator::new(&tree, &state);
        assert_eq!(
            v.validate("nope").unwrap_err().message,
            "Unknown command: \"nope\""
        );
        assert_eq!(
            v.validate("net").unwrap_err().message,
            "\"net\" has several sub-commands"
        );
        assert!(v.validate("net ping").is_ok());
    }

    #[test]
    fn rejects_unavailable_and_bad_arguments() {
        let tree = tree();
        let mut state = SessionState::new(StateId::ROOT);
        {
            let v = CommandValidator::new(&tree, &state);
            assert!(v.validate("secret").is_err());
            assert!(v.validate("say").is_err());
            assert!(v.validate("say hi").is_ok());
        }
        state.set("unlocked", true).unwrap();
        let v = CommandValidator::new(&tree, &state);
        assert!(v.validate("secret").is_ok());
    }

    #[test]
    fn unterminated_quote_points_at_quote() {
        let tree = tree();
        let state = SessionState::new(StateId::ROOT);
        let v = CommandValidator::new(&tree, &state);
        assert_eq!(v.validate("say 'oops").unwrap_err().cursor, 4);
        assert_eq!(v.validate("say oops\\").unwrap_err().cursor, 8);
    }

    #[test]
    fn predicate_and_chain() {
        let tree = tree();
        let state = SessionState::new(StateId::ROOT);
        let commands = CommandValidator::new(&tree, &state);
        let short = PredicateValidator::new(|s: &str| s.len() <= 8, "input too long");
        let all = AllOf::new(vec![&short, &commands]);

        assert!(all.validate("say hi").is_ok());
        assert_eq!(
            all.validate("say hello world").unwrap_err().message,
            "input too long"
        );
        assert!(all.validate("nope").is_err());
    }
}
