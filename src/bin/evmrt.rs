// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::error::Error;
use std::fs;

use clap::{arg, Arg, ArgMatches, Command};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use evmrt::bytecode::{analyze, opcode, AnalysisConfig, CodeAnalyzer};
use evmrt::execution::{CallKind, CallRequest, CallScheme, MemoryHost, Word};
use evmrt::fork::{self, Fork};
use evmrt::program::Program;
use evmrt::util::{FromHexString, ToHexString};

fn main() -> Result<(), Box<dyn Error>> {
    let matches = cli().get_matches();
    if matches.is_present("verbose") {
        enable_logging(LevelFilter::Debug)?;
    }
    let fork = selected_fork(&matches)?;
    let ok = match matches.subcommand() {
        Some(("analyze", args)) => analyze_cmd(args, fork)?,
        Some(("disassemble", args)) => disassemble_cmd(args)?,
        Some(("run", args)) => run_cmd(args, fork)?,
        _ => unreachable!(),
    };
    // Bad bytecode and failed executions are reported on stdout but
    // still flip the exit status for scripting.
    std::process::exit(if ok { 0 } else { 1 });
}

fn cli() -> Command<'static> {
    let code_flag = Arg::new("code").short('c').long("code");
    let target = Arg::new("target").required(true);
    Command::new("evmrt")
        .about("EVM bytecode analyser and interpreter")
        .version("0.1.0")
        .subcommand_required(true)
        .arg(arg!(--verbose "Show verbose output"))
        .arg(
            Arg::new("fork")
                .long("fork")
                .takes_value(true)
                .help("Hardfork to analyse and execute under"),
        )
        .subcommand(
            Command::new("analyze")
                .about("Validate bytecode and print its structural analysis")
                .arg(code_flag.clone())
                .arg(target.clone())
                .visible_alias("a"),
        )
        .subcommand(
            Command::new("disassemble")
                .about("Disassemble a raw hex string into EVM instructions")
                .arg(code_flag.clone())
                .arg(target.clone())
                .visible_alias("d"),
        )
        .subcommand(
            Command::new("run")
                .about("Execute bytecode against a fresh in-memory host")
                .arg(code_flag)
                .arg(
                    Arg::new("gas")
                        .long("gas")
                        .takes_value(true)
                        .help("Gas budget for the call"),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .takes_value(true)
                        .help("Calldata as a hex string"),
                )
                .arg(target)
                .visible_alias("r"),
        )
}

fn selected_fork(matches: &ArgMatches) -> Result<&'static Fork, Box<dyn Error>> {
    match matches.get_one::<String>("fork") {
        Some(name) => {
            Fork::from_name(name).ok_or_else(|| format!("unknown fork: {name}").into())
        }
        None => Ok(fork::DEFAULT),
    }
}

/// Route library logging to the console.  Only ever called once,
/// before any subcommand does real work.
fn enable_logging(level: LevelFilter) -> Result<(), Box<dyn Error>> {
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l:<5} {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

/// Read the bytecode operand: either inline hex (with `--code`) or
/// the contents of a file.
fn read_code(args: &ArgMatches) -> Result<Vec<u8>, Box<dyn Error>> {
    let target = args.get_one::<String>("target").unwrap();
    let mut hex = String::new();
    if args.contains_id("code") {
        hex.push_str(target);
    } else {
        let contents = fs::read_to_string(target)?;
        for l in contents.lines() {
            hex.push_str(l.trim());
        }
    }
    Ok(hex.from_hex_string()?)
}

/// Validate a bytecode sequence and print what the analysis found.
fn analyze_cmd(args: &ArgMatches, fork: &'static Fork) -> Result<bool, Box<dyn Error>> {
    let bytes = read_code(args)?;
    let config = AnalysisConfig {
        fork,
        ..AnalysisConfig::default()
    };
    let analysis = match CodeAnalyzer::new(config).analyze(&bytes) {
        Ok(a) => a,
        Err(e) => {
            println!("analysis failed: {e}");
            return Ok(false);
        }
    };
    println!("code: {} bytes", analysis.full_code().len());
    println!("runtime: {} bytes", analysis.runtime_code().len());
    match analysis.metadata() {
        Some(m) => {
            let [major, minor, patch] = m.solc;
            println!("metadata: {} bytes, solc {major}.{minor}.{patch}", m.len);
        }
        None => println!("metadata: none"),
    }
    println!("jumpdests: {}", analysis.jumpdest_count());
    // Print the basic-block table.
    let program = Program::compile(&analysis, fork)?;
    println!("instructions: {}", program.len());
    for (index, block) in program.blocks() {
        println!(
            "block @{index}: gas {} stack req {} growth {}",
            block.gas_cost, block.stack_req, block.stack_max_growth
        );
    }
    Ok(true)
}

/// Disassemble a bytecode sequence, one instruction per line.
fn disassemble_cmd(args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let bytes = read_code(args)?;
    let analysis = match analyze(&bytes) {
        Ok(a) => a,
        Err(e) => {
            println!("analysis failed: {e}");
            return Ok(false);
        }
    };
    let mut pc = if analysis.runtime_code().is_empty() {
        None
    } else {
        Some(0)
    };
    while let Some(at) = pc {
        let op = analysis.runtime_code()[at];
        let width = opcode::push_width(op);
        if width > 0 {
            let operand = &analysis.runtime_code()[at + 1..at + 1 + width];
            println!("{:#08x}: {} {}", at, opcode::mnemonic(op), operand.to_hex_string());
        } else {
            println!("{:#08x}: {}", at, opcode::mnemonic(op));
        }
        pc = analysis.next_pc(at);
    }
    Ok(true)
}

/// Execute a bytecode sequence and print the outcome.
fn run_cmd(args: &ArgMatches, fork: &'static Fork) -> Result<bool, Box<dyn Error>> {
    let bytes = read_code(args)?;
    let gas = match args.get_one::<String>("gas") {
        Some(g) => g.parse::<u64>()?,
        None => 10_000_000,
    };
    let input = match args.get_one::<String>("input") {
        Some(hex) => hex.as_str().from_hex_string()?,
        None => Vec::new(),
    };
    // Install the code at a fixed address and call it.
    let contract = [0x10u8; 20];
    let sender = [0x20u8; 20];
    let mut host = MemoryHost::new().with_fork(fork);
    host.insert_account(contract, Word::ZERO, bytes);
    let result = host.transact(CallRequest {
        kind: CallKind::Call(CallScheme::Call),
        gas,
        caller: sender,
        target: contract,
        code_address: contract,
        value: Word::ZERO,
        input,
        is_static: false,
    });
    println!("success: {}", result.success);
    println!("gas used: {}", gas - result.gas_left);
    println!("output: {}", result.output.to_hex_string());
    Ok(result.success)
}
