// ABOUTME: CLI entry point: the run command, permission flags, and the REPL shell

use clap::{CommandFactory, Parser as CliParser, Subcommand};
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tern::config::{self, Permissions};
use tern::eval::Interpreter;
use tern::lexer::Lexer;
use tern::parser::Parser;
use tern::resolver::resolve;

const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 64;
const EXIT_SYNTAX: i32 = 65;
const EXIT_RUNTIME: i32 = 70;

const HISTORY_FILE: &str = ".tern_history";

/// Tern: a small dynamically typed, lexically scoped scripting language.
#[derive(CliParser, Debug)]
#[command(name = "tern")]
#[command(version = config::VERSION)]
#[command(about = "Interpreter for the Tern scripting language")]
#[command(long_about = "A tree-walking interpreter with permission-gated host I/O.\n\
Run without arguments to start the REPL.")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Alias for the help command
    #[arg(long = "h", hide = true)]
    help_alias: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a script file: run [permission-flags...] <path> [program-args...]
    Run {
        /// Permission flags (--allow-input, --allow-network, --allow-read,
        /// --allow-write), then the script path, then program arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        args: Vec<String>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_USAGE,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if cli.help_alias {
        let _ = Cli::command().print_help();
        std::process::exit(EXIT_OK);
    }

    let level = if cli.verbose {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    let _ = simple_logger::init_with_level(level);

    let code = match cli.command {
        Some(Command::Run { args }) => run_command(&args),
        None => repl(),
    };
    std::process::exit(code);
}

// ============================================================================
// Script execution
// ============================================================================

/// Splits the `run` argument list into permissions, script path, and program
/// arguments. Flag scanning stops at the first token that is not a known
/// permission flag; everything after the script path passes through
/// unconsumed, flags included.
fn split_run_args(args: &[String]) -> (Permissions, Option<String>, Vec<String>) {
    let mut permissions = Permissions::default();
    let mut script = None;
    let mut program_args = Vec::new();

    for arg in args {
        if script.is_none() {
            if permissions.apply_flag(arg) {
                continue;
            }
            script = Some(arg.clone());
        } else {
            program_args.push(arg.clone());
        }
    }

    (permissions, script, program_args)
}

fn run_command(args: &[String]) -> i32 {
    let (permissions, script, program_args) = split_run_args(args);

    let Some(script) = script else {
        eprintln!("error: missing script path");
        eprintln!("usage: tern run [permission-flags...] <path> [program-args...]");
        return EXIT_USAGE;
    };

    if !program_args.is_empty() {
        debug!("program arguments (reserved): {:?}", program_args);
    }

    let source = match std::fs::read_to_string(&script) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read '{}': {}", script, err);
            return EXIT_USAGE;
        }
    };

    run_source(&source, permissions)
}

/// The full pipeline over one source file. Any front-end diagnostic prevents
/// execution.
fn run_source(source: &str, permissions: Permissions) -> i32 {
    let (tokens, mut errors) = Lexer::new(source).scan_tokens();
    debug!("lexed {} tokens", tokens.len());

    let parsed = Parser::new(tokens).parse();
    debug!("parsed {} top-level statements", parsed.statements.len());
    errors.extend(parsed.errors);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{error}");
        }
        return EXIT_SYNTAX;
    }

    let (locals, resolve_errors) = resolve(&parsed.statements);
    if !resolve_errors.is_empty() {
        for error in &resolve_errors {
            eprintln!("{error}");
        }
        return EXIT_SYNTAX;
    }
    debug!("resolved {} local name uses", locals.len());

    let mut interp = Interpreter::new(permissions);
    interp.add_resolutions(locals);
    match interp.interpret(&parsed.statements) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            eprintln!("{err}");
            EXIT_RUNTIME
        }
    }
}

// ============================================================================
// REPL
// ============================================================================

fn repl() -> i32 {
    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);
    println!("{}", config::WELCOME_FOOTER);

    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("error: failed to initialize REPL: {err}");
            return EXIT_USAGE;
        }
    };
    let _ = rl.load_history(HISTORY_FILE);

    // Definitions persist across lines; expression ids keep counting up so
    // resolver annotations from different lines never collide.
    let mut interp = Interpreter::new(Permissions::interactive());
    let mut next_id = 0;

    loop {
        match rl.readline("tern> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match line.trim() {
                    "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "clear" => {
                        print!("\x1B[2J\x1B[H");
                        continue;
                    }
                    _ => {}
                }

                next_id = eval_line(&line, &mut interp, next_id);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    EXIT_OK
}

/// Evaluates one REPL line. Errors abort only this line; the environment and
/// everything defined on earlier lines survive.
fn eval_line(line: &str, interp: &mut Interpreter, first_id: usize) -> usize {
    let (tokens, lex_errors) = Lexer::new(line).scan_tokens();
    let parsed = Parser::with_first_id(tokens, first_id).parse();

    let mut errors = lex_errors;
    errors.extend(parsed.errors);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{error}");
        }
        return parsed.next_id;
    }

    let (locals, resolve_errors) = resolve(&parsed.statements);
    if !resolve_errors.is_empty() {
        for error in &resolve_errors {
            eprintln!("{error}");
        }
        return parsed.next_id;
    }

    interp.add_resolutions(locals);
    match interp.interpret_repl(&parsed.statements) {
        Ok(Some(value)) => println!("=> {value}"),
        Ok(None) => {}
        Err(err) => eprintln!("{err}"),
    }
    parsed.next_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_run_args_plain_script() {
        let (perms, script, rest) = split_run_args(&strings(&["main.tn"]));
        assert!(!perms.input);
        assert_eq!(script.as_deref(), Some("main.tn"));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_split_run_args_with_permissions() {
        let (perms, script, rest) = split_run_args(&strings(&[
            "--allow-input",
            "--allow-read",
            "main.tn",
            "one",
            "two",
        ]));
        assert!(perms.input);
        assert!(perms.read);
        assert!(!perms.network);
        assert_eq!(script.as_deref(), Some("main.tn"));
        assert_eq!(rest, strings(&["one", "two"]));
    }

    #[test]
    fn test_split_run_args_unknown_flag_after_script_passes_through() {
        let (perms, script, rest) =
            split_run_args(&strings(&["main.tn", "--allow-input", "-x"]));
        // Flags after the script path are program args, not permissions.
        assert!(!perms.input);
        assert_eq!(script.as_deref(), Some("main.tn"));
        assert_eq!(rest, strings(&["--allow-input", "-x"]));
    }

    #[test]
    fn test_split_run_args_missing_script() {
        let (_, script, _) = split_run_args(&strings(&["--allow-input"]));
        assert!(script.is_none());
    }

    #[test]
    fn test_run_source_exit_codes() {
        assert_eq!(run_source("print(1);", Permissions::default()), EXIT_OK);
        assert_eq!(run_source("var = ;", Permissions::default()), EXIT_SYNTAX);
        assert_eq!(run_source("break;", Permissions::default()), EXIT_SYNTAX);
        assert_eq!(
            run_source("const k = 7; k = 8;", Permissions::default()),
            EXIT_RUNTIME
        );
    }
}
