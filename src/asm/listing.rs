//! Listing formatter for counter machine programs.
//!
//! Converts a loaded program back to canonical source text.

use crate::asm::parser::LoadedProgram;
use crate::asm::config::Configuration;
use crate::machine::Instruction;

/// Format a single instruction as source text.
pub fn format_instruction(instr: &Instruction) -> String {
    match instr {
        Instruction::Halt => "halt".to_string(),
        Instruction::Increment { register, next } => format!("inc(r{}), {}", register, next),
        Instruction::Decrement { register, nonzero, zero } => {
            format!("dec(r{}), {}, {}", register, nonzero, zero)
        }
    }
}

/// Format the configuration line.
///
/// A non-numeric start label needs at least one register value to be read
/// back, since the bare label alone is not a valid configuration line.
pub fn format_config(config: &Configuration) -> String {
    let mut line = config.start_label.to_string();
    for value in config.registers.as_slice() {
        line.push_str(&format!(", {}", value));
    }
    line
}

/// Format a whole program, configuration first, instructions in source
/// order.
pub fn format_program(loaded: &LoadedProgram) -> String {
    let width = loaded.program
        .iter()
        .map(|(label, _)| label.as_str().len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    output.push_str(&format_config(&loaded.config));
    output.push('\n');

    for (label, instr) in loaded.program.iter() {
        let head = format!("{}:", label);
        output.push_str(&format!("{:<w$} {}\n", head, format_instruction(instr), w = width + 1));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::parser::load;
    use crate::machine::RegisterFile;
    use proptest::prelude::*;

    #[test]
    fn test_format_instructions() {
        assert_eq!(format_instruction(&Instruction::Halt), "halt");
        assert_eq!(
            format_instruction(&Instruction::Increment { register: 2, next: "b".into() }),
            "inc(r2), b"
        );
        assert_eq!(
            format_instruction(&Instruction::Decrement {
                register: 0,
                nonzero: "b".into(),
                zero: "c".into(),
            }),
            "dec(r0), b, c"
        );
    }

    #[test]
    fn test_format_program() {
        let loaded = load("# adder\n1,2,3\n1:dec(r1),2,end\n2:inc(r0),1\nend:halt\n").unwrap();
        let text = format_program(&loaded);

        assert_eq!(
            text,
            "1, 2, 3\n1:   dec(r1), 2, end\n2:   inc(r0), 1\nend: halt\n"
        );
    }

    fn label() -> impl Strategy<Value = String> {
        "[a-z0-9_]{1,6}"
    }

    fn start_label() -> impl Strategy<Value = String> {
        "[a-z_]{1,6}|[0-9]{1,6}"
    }

    fn instruction() -> impl Strategy<Value = Instruction> {
        prop_oneof![
            Just(Instruction::Halt),
            (0usize..16, label()).prop_map(|(register, next)| Instruction::Increment {
                register,
                next: next.as_str().into(),
            }),
            (0usize..16, label(), label()).prop_map(|(register, nz, z)| Instruction::Decrement {
                register,
                nonzero: nz.as_str().into(),
                zero: z.as_str().into(),
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_listing_loads_back(
            start in start_label(),
            registers in proptest::collection::vec(0u64..1_000_000, 1..6),
            defs in proptest::collection::btree_map(label(), instruction(), 0..12),
        ) {
            let mut text = format!("{}", start);
            for value in &registers {
                text.push_str(&format!(",{}", value));
            }
            text.push('\n');
            for (label, instr) in &defs {
                text.push_str(&format!("{}: {}\n", label, format_instruction(instr)));
            }

            let loaded = load(&text).unwrap();
            let reloaded = load(&format_program(&loaded)).unwrap();

            prop_assert_eq!(&reloaded, &loaded);
            prop_assert_eq!(reloaded.program.len(), defs.len());
            prop_assert_eq!(reloaded.config.registers, RegisterFile::from_values(registers));
        }
    }
}
