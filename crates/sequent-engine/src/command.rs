//! Host-owned command registry.
//!
//! Commands are registered by explicit calls at startup; there is no
//! load-order registration. The host hands each command a raw argument
//! vector and the mutable design, mirroring the pass interface of the
//! netlist tooling this engine plugs into.

use crate::{EngineError, EngineResult};
use sequent_netlist::Design;
use std::collections::BTreeMap;

pub trait Command {
    fn name(&self) -> &'static str;

    /// One-line usage summary.
    fn help(&self) -> &'static str;

    fn execute(&self, args: &[String], design: &mut Design) -> EngineResult<()>;
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry::default()
    }

    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.insert(command.name(), command);
    }

    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.values().map(|command| command.as_ref())
    }

    /// Split a command line into name and arguments, then dispatch.
    pub fn execute_line(&self, line: &str, design: &mut Design) -> EngineResult<()> {
        let mut tokens = line.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| EngineError::BadArguments("empty command line".to_string()))?;
        let args: Vec<String> = tokens.map(str::to_string).collect();
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| EngineError::UnknownCommand(name.to_string()))?;
        command.execute(&args, design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Touch;

    impl Command for Touch {
        fn name(&self) -> &'static str {
            "touch"
        }

        fn help(&self) -> &'static str {
            "touch -- append an empty module"
        }

        fn execute(&self, args: &[String], design: &mut Design) -> EngineResult<()> {
            let name = args.first().cloned().unwrap_or_else(|| "anon".to_string());
            design.add_module(sequent_netlist::Module::new(name));
            Ok(())
        }
    }

    #[test]
    fn dispatches_by_first_token() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Touch));
        let mut design = Design::new();
        registry.execute_line("touch top", &mut design).unwrap();
        assert_eq!(design.modules[0].name, "top");
    }

    #[test]
    fn unknown_command_is_an_error() {
        let registry = CommandRegistry::new();
        let mut design = Design::new();
        let err = registry.execute_line("nope", &mut design).unwrap_err();
        assert!(matches!(err, EngineError::UnknownCommand(name) if name == "nope"));
    }

    #[test]
    fn empty_line_is_an_error() {
        let registry = CommandRegistry::new();
        let mut design = Design::new();
        assert!(matches!(
            registry.execute_line("  ", &mut design),
            Err(EngineError::BadArguments(_))
        ));
    }
}
