use clap::{Parser, Subcommand};
use infix::{
    Engine, EngineOptions, LocalMap, NoMembers, NoVariables, StaticType, Variables, render_error,
};
use std::io::{BufRead, BufReader};
use std::process::ExitCode;

/// Infix - evaluate or compile infix expressions
#[derive(Parser, Debug)]
#[command(name = "infix")]
#[command(about = "Evaluate or compile infix expressions", long_about = None)]
struct Args {
    /// Log parser, solver and compiler activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Maximum expression nesting depth
    #[arg(long, global = true, default_value_t = EngineOptions::default().max_depth)]
    max_depth: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression and print its value
    Eval {
        /// Bind a variable, e.g. `--var x=42` or `--var name="bob"`
        #[arg(long = "var", value_name = "NAME=LITERAL", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Expression to evaluate (if not provided, reads lines from stdin)
        expression: Option<String>,
    },

    /// Compile an expression and print the instruction listing
    Compile {
        /// Declare a local, e.g. `--local x:int` or `--local n:Integer`
        #[arg(long = "local", value_name = "NAME:TYPE", value_parser = parse_local)]
        locals: Vec<(String, StaticType)>,

        /// Expression to compile (if not provided, reads lines from stdin)
        expression: Option<String>,
    },

    /// Print the prefix token stream an expression parses to
    Parse {
        /// Expression to parse (if not provided, reads lines from stdin)
        expression: Option<String>,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, literal)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), literal.to_string()))
        }
        _ => Err(format!("expected NAME=LITERAL, got '{}'", s)),
    }
}

fn parse_local(s: &str) -> Result<(String, StaticType), String> {
    let (name, ty) = s
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:TYPE, got '{}'", s))?;
    let ty = ty.trim().parse::<StaticType>().map_err(|e| e.to_string())?;
    Ok((name.trim().to_string(), ty))
}

/// Runs one expression; returns whether it succeeded.
struct Session {
    engine: Engine,
    vars: Variables,
    locals: LocalMap,
}

impl Session {
    fn run(&self, command: &Command, source: &str) -> bool {
        let mut vars = self.vars.clone();
        let result = match command {
            Command::Eval { .. } => self
                .engine
                .evaluate(source, &mut vars)
                .map(|value| println!("{}", value)),
            Command::Compile { .. } => self
                .engine
                .compile(source, &self.locals, &NoMembers)
                .map(|code| println!("{:?}", code)),
            Command::Parse { .. } => self
                .engine
                .parse(source)
                .map(|stream| println!("{}", stream)),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                render_error(&e, source);
                false
            }
        }
    }
}

fn build_session(args: &Args) -> Result<Session, ExitCode> {
    let engine = Engine::new(EngineOptions {
        max_depth: args.max_depth,
    });

    let mut vars = Variables::new();
    let mut locals = LocalMap::new();
    match &args.command {
        Command::Eval { vars: bindings, .. } => {
            // Literals are expressions themselves: `--var x=-1` or `--var s="a"+1`
            for (name, literal) in bindings {
                match engine.evaluate(literal, &mut NoVariables) {
                    Ok(value) => vars.insert(name.clone(), value),
                    Err(e) => {
                        eprintln!("invalid value for variable '{}':", name);
                        render_error(&e, literal);
                        return Err(ExitCode::from(2));
                    }
                }
            }
        }
        Command::Compile {
            locals: declarations,
            ..
        } => {
            for (name, ty) in declarations {
                if let Err(e) = locals.declare(name.clone(), *ty) {
                    eprintln!("cannot declare local '{}': {}", name, e);
                    return Err(ExitCode::from(2));
                }
            }
        }
        Command::Parse { .. } => {}
    }

    Ok(Session {
        engine,
        vars,
        locals,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG wins; otherwise --verbose selects debug and the default is warn
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let session = match build_session(&args) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let expression = match &args.command {
        Command::Eval { expression, .. }
        | Command::Compile { expression, .. }
        | Command::Parse { expression } => expression,
    };

    // Check if we have a direct expression argument
    if let Some(expr) = expression {
        return if session.run(&args.command, expr) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    // Otherwise, one expression per stdin line
    let stdin = std::io::stdin();
    let reader = BufReader::new(stdin.lock());
    let mut all_ok = true;

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading line from stdin: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        tracing::debug!(line = %line, "read expression");
        all_ok &= session.run(&args.command, &line);
    }

    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
