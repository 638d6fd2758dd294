//! Minimal interactive pump loop: reads lines from stdin, feeds them to the
//! Apple 1's keyboard register, and prints whatever the display register
//! emits. Not the `START`/`STEP`/`EXAMINE`/`DEPOSIT`/`BREAK` command
//! language -- just enough to type at WozMon and BASIC over a plain
//! terminal.

use std::collections::VecDeque;
use std::io::{self, Write};

use apple1::terminal::Terminal;
use apple1::Apple1;
use sixty502::Word;

const WOZMON_ORIGIN: Word = Word(0xFF00);
const RESET_VECTOR: Word = Word(0xFFFC);
const PUMP_STEPS: usize = 50_000;

/// Feeds queued bytes to the CPU one at a time and collects emitted output,
/// in lieu of a real terminal attached to stdin/stdout.
#[derive(Default)]
struct StdioTerminal {
    pending: VecDeque<u8>,
    out: Vec<u8>,
}

impl StdioTerminal {
    fn push_line(&mut self, line: &str) {
        for ch in line.chars() {
            match ch {
                '\n' | '\r' => {}
                other => self.pending.push_back(other.to_ascii_uppercase() as u8),
            }
        }
        self.pending.push_back(b'\r');
    }

    fn flush_output(&mut self) -> io::Result<()> {
        if !self.out.is_empty() {
            io::stdout().write_all(&self.out)?;
            io::stdout().flush()?;
            self.out.clear();
        }
        Ok(())
    }
}

impl Terminal for StdioTerminal {
    fn poll_key(&mut self) -> Option<u8> {
        self.pending.pop_front()
    }

    fn emit(&mut self, ch: u8) {
        self.out.push(ch);
    }
}

fn main() -> io::Result<()> {
    let mut machine = Apple1::new(StdioTerminal::default());

    // No real WozMon/BASIC ROM images ship with this crate (see DESIGN.md);
    // this demo is wired to accept them via environment-provided bytes if a
    // host wants to attach real ROMs. Without that, it still demonstrates
    // the reset/step/terminal wiring against an empty ROM image.
    machine.bus_mut().load_wozmon_rom(&[0x00; 256]);
    machine.bus_mut().load_ram(RESET_VECTOR, &[0x00, 0xFF]);
    machine.reset().expect("reset vector is always readable");

    println!("apple1 demo -- type a line and press enter; Ctrl-D to quit.");

    let stdin = io::stdin();
    loop {
        for _ in 0..PUMP_STEPS {
            if machine.step().is_err() {
                break;
            }
        }
        machine.bus_mut().terminal_mut().flush_output()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        machine.bus_mut().terminal_mut().push_line(&line);
    }

    println!("\nbye.");
    Ok(())
}
