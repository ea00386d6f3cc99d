//! MIPS Simulator - CLI Entry Point
//!
//! Commands:
//! - `mips-sim repl` - Read, decode and execute lines from stdin (default)
//! - `mips-sim run <program>` - Run a program file to completion
//! - `mips-sim disasm <program>` - Print a machine-word listing

use clap::{Parser, Subcommand};
use mips::{Cpu, Simulator};
use std::io::BufRead;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Upper bound for `--memory-kib`.
const MAX_MEMORY_KIB: u64 = 1024 * 1024;

#[derive(Parser)]
#[command(name = "mips-sim")]
#[command(version)]
#[command(about = "An instruction-level simulator for a subset of MIPS32")]
struct Cli {
    /// Simulated memory size in KiB (at most 1 GiB)
    #[arg(
        long,
        global = true,
        default_value = "1024",
        value_parser = clap::value_parser!(u64).range(0..=MAX_MEMORY_KIB),
    )]
    memory_kib: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive read-decode-execute loop; type END to exit
    Repl,
    /// Run a program until it finishes
    Run {
        /// Path to the assembly source file
        program: String,
        /// Maximum number of instructions to execute
        #[arg(short, long, default_value = "10000")]
        max_steps: u64,
        /// Print every executed instruction
        #[arg(short, long)]
        trace: bool,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the program with addresses and machine words
    Disasm {
        /// Path to the assembly source file
        program: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let memory_bytes = (cli.memory_kib * 1024) as usize;
    debug!(memory_bytes, "configuration loaded");

    match cli.command {
        None | Some(Commands::Repl) => repl(memory_bytes),
        Some(Commands::Run { program, max_steps, trace, json }) => {
            run_program(&program, memory_bytes, max_steps, trace, json);
        }
        Some(Commands::Disasm { program }) => disassemble_file(&program),
    }
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn repl(memory_bytes: usize) {
    let mut cpu = Cpu::with_memory_size(memory_bytes);

    println!("MIPS interpreter started, use 'END' to exit.");
    println!();

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("failed to read input: {}", e);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed == "END" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let instr = match mips::decode(&line) {
            Ok(i) => i,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if let Err(e) = cpu.execute(&instr) {
            println!("{}", e);
            continue;
        }
        cpu.pc += 1;

        println!("instruction: {}  [{:08x}]", instr, instr.encode());
        print_registers(&cpu);
        println!();
    }

    info!(executed = cpu.pc, "interpreter finished");
    println!("MIPS interpreter finished execution.");
}

fn run_program(path: &str, memory_bytes: usize, max_steps: u64, trace: bool, json: bool) {
    let program = match mips::load_program(path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("failed to load program: {}", e);
            std::process::exit(1);
        }
    };
    info!(path, instructions = program.len(), "program loaded");

    if program.is_empty() {
        eprintln!("no instructions to execute");
        std::process::exit(1);
    }

    let mut sim = Simulator::with_cpu(Cpu::with_memory_size(memory_bytes));
    sim.load(program);

    let result = sim.run_with(max_steps, |pc, instr| {
        if trace {
            eprintln!("{:04}: {}", pc, instr);
        }
    });
    let steps = match result {
        Ok(steps) => steps,
        Err(e) => {
            eprintln!("error at pc {}: {}", sim.cpu().pc, e);
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&sim.inspect()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("Executed: {} instructions", steps);
        println!("PC:       {}", sim.cpu().pc);
        print_registers(sim.cpu());
    }

    if !sim.is_finished() {
        eprintln!("reached max steps limit ({}); use --max-steps to increase", max_steps);
    }
}

fn disassemble_file(path: &str) {
    let program = match mips::load_program(path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("failed to load program: {}", e);
            std::process::exit(1);
        }
    };

    print!("{}", mips::listing(&program.instructions()));
}

fn print_registers(cpu: &Cpu) {
    let mut any = false;
    for (reg, value) in cpu.regs.non_zero() {
        println!("  {:<6} = {:>11}  ({:#010x})", reg.to_string(), value, value as u32);
        any = true;
    }
    if !any {
        println!("  (all registers zero)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_memory_kib_is_bounded() {
        let cli = Cli::try_parse_from(["mips-sim", "--memory-kib", "1048576", "repl"]).unwrap();
        assert_eq!(cli.memory_kib, MAX_MEMORY_KIB);

        assert!(Cli::try_parse_from(["mips-sim", "--memory-kib", "1048577"]).is_err());
        assert!(Cli::try_parse_from(["mips-sim", "--memory-kib", "18446744073709551615"]).is_err());
    }
}
