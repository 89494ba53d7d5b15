use anyhow::Result;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use clap::{Parser, ValueEnum};
use rpds::HashTrieMap;
use tracing_subscriber::filter::LevelFilter;
use util::repl;

use ski::{
    evaluator::{self, DivergenceError, Limits},
    parser,
    prelude::*,
    search::{Search, SearchConfig},
    term::{Atom, Term},
};

fn describe(c: Option<&char>) -> String {
    c.map(|c| format!("'{c}'"))
        .unwrap_or_else(|| "end of the input".to_string())
}

fn build_report(e: Error) -> Report<Span> {
    use chumsky::error::SimpleReason;
    let report = Report::build(ReportKind::Error, (), e.span().start);
    match e.reason() {
        SimpleReason::Unexpected => {
            let found = describe(e.found());
            let expected = e
                .expected()
                .map(|c| describe(c.as_ref()))
                .collect::<Vec<_>>()
                .join(", ");
            let expected = if expected.is_empty() {
                "something else"
            } else {
                &expected
            };
            report
                .with_message(format!("Unexpected {found}, expected {expected}"))
                .with_label(
                    Label::new(e.span())
                        .with_message(format!("Unexpected {}", found.fg(Color::Red)))
                        .with_color(Color::Red),
                )
        }
        SimpleReason::Unclosed { span, delimiter } => report
            .with_message(format!("Unclosed delimiter {}", delimiter.fg(Color::Yellow)))
            .with_label(
                Label::new(span.clone())
                    .with_message(format!(
                        "Unclosed delimiter {}",
                        delimiter.fg(Color::Yellow)
                    ))
                    .with_color(Color::Yellow),
            )
            .with_label(
                Label::new(e.span())
                    .with_message(format!(
                        "Must be closed before this {}",
                        describe(e.found()).fg(Color::Red)
                    ))
                    .with_color(Color::Red),
            ),
        SimpleReason::Custom(msg) => report.with_message(msg).with_label(
            Label::new(e.span())
                .with_message(format!("{}", msg.fg(Color::Red)))
                .with_color(Color::Red),
        ),
    }
    .finish()
}

enum Failure<'a> {
    Parse(&'a str, Vec<Error>),
    Diverged(DivergenceError),
    Usage(String),
}
impl From<DivergenceError> for Failure<'_> {
    fn from(e: DivergenceError) -> Self {
        Failure::Diverged(e)
    }
}

type CommandResult<'a> = Result<(), Failure<'a>>;

struct Session {
    bindings: HashTrieMap<char, Term>,
    args: Vec<Term>,
    config: SearchConfig,
}
impl Session {
    fn parse<'i>(&self, input: &'i str) -> Result<Term, Failure<'i>> {
        let term = parser::parse(input).map_err(|e| Failure::Parse(input, e.errors))?;
        Ok(term.substitute(&|c| self.bindings.get(&c).cloned()))
    }

    fn split<'i>(input: &'i str, usage: &str) -> Result<(&'i str, &'i str), Failure<'i>> {
        input
            .split_once(';')
            .ok_or_else(|| Failure::Usage(format!("usage: {usage}")))
    }

    fn show_parsed<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let term = self.parse(input)?;
        println!("{term}");
        Ok(())
    }

    fn simplify<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let term = self.parse(input)?;
        let (normal, reduction) = evaluator::simplify_counted(&term, &self.config.limits)?;
        tracing::debug!(steps = reduction.steps, "reduced {term}");
        println!("{normal}");
        Ok(())
    }

    fn equivalent<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let (lhs, rhs) = Self::split(input, ":equivalent lhs ; rhs")?;
        let lhs = self.parse(lhs)?;
        let rhs = self.parse(rhs)?;
        println!(
            "{}",
            evaluator::equivalent_with(&lhs, &rhs, &self.config.limits)?
        );
        Ok(())
    }

    fn find<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let usage = ":find start ; target [; depth]";
        let (start, rest) = Self::split(input, usage)?;
        let (target, depth) = match rest.split_once(';') {
            Some((target, depth)) => (
                target,
                depth
                    .trim()
                    .parse()
                    .map_err(|e| Failure::Usage(format!("invalid depth: {e}")))?,
            ),
            None => (rest, self.config.max_depth),
        };
        let start = self.parse(start)?;
        let target = self.parse(target)?;
        let config = SearchConfig {
            max_depth: depth,
            ..self.config
        };
        let report = Search::new(config, &self.args, &target)?.run(&start);
        match report.found {
            Some(found) => println!(
                "{found}    (depth {}, {} atoms)",
                report.depth,
                found.size()
            ),
            None => println!("not found within depth {depth}"),
        }
        tracing::info!(
            generated = report.generated,
            duplicates = report.duplicates,
            diverged = report.diverged,
            "search finished"
        );
        Ok(())
    }

    fn set_args<'i>(&mut self, input: &'i str) -> CommandResult<'i> {
        let args = self.parse(input)?;
        self.args = args.elements().to_vec();
        println!("fixed args: {args}");
        Ok(())
    }

    fn bind<'i>(&mut self, input: &'i str) -> CommandResult<'i> {
        let (name, body) = input
            .split_once('=')
            .ok_or_else(|| Failure::Usage("usage: :let x = term".to_string()))?;
        let mut chars = name.trim().chars();
        let name = match (chars.next(), chars.next()) {
            (Some(c), None) if !Atom::from(c).is_combinator() && c != '(' && c != ')' => c,
            _ => {
                return Err(Failure::Usage(format!(
                    "`{}` is not a variable name",
                    name.trim()
                )))
            }
        };
        let term = self.parse(body)?;
        println!("{name} = {term}");
        self.bindings = self.bindings.insert(name, term);
        Ok(())
    }

    fn show_help() {
        println!(
            "{}",
            r#"
term                              -- same as :simplify term
:parse       term                 -- show the parsed term
:simplify    term                 -- show the normal form
:equivalent  lhs ; rhs            -- compare normal forms
:find        start ; target [; n] -- insert S/K into start until `start args` reduces to target
:args        terms                -- set the arguments used by :find
:let         x = term             -- substitute term for the variable x from now on
:help                             -- show this message
        "#
            .trim()
        );
    }

    fn handle_repl_input<'i>(&mut self, input: &'i str) -> CommandResult<'i> {
        let (cmd, input) = if let Some(stripped) = input.strip_prefix(':') {
            stripped
                .trim_start()
                .split_once(' ')
                .unwrap_or((stripped, ""))
        } else {
            ("", input)
        };
        match cmd {
            "p" | "parse" => self.show_parsed(input)?,
            "" | "s" | "simplify" => self.simplify(input)?,
            "e" | "equivalent" => self.equivalent(input)?,
            "f" | "find" => self.find(input)?,
            "a" | "args" => self.set_args(input)?,
            "l" | "let" => self.bind(input)?,
            "h" | "he" | "hel" | "help" => Self::show_help(),
            _ => {
                eprintln!("Unknown command {cmd}");
                Self::show_help();
            }
        }
        Ok(())
    }
}
impl repl::Repl for Session {
    type Error = anyhow::Error;
    const HISTORY: Option<&'static str> = Some("/tmp/ski.history");
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }
        match self.handle_repl_input(input) {
            Ok(()) => {}
            Err(Failure::Parse(source, es)) => {
                for e in es {
                    build_report(e).eprint(Source::from(source))?;
                }
            }
            Err(Failure::Diverged(e)) => eprintln!("{e}"),
            Err(Failure::Usage(msg)) => eprintln!("{msg}"),
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Reduces S/K/I combinator terms and searches for combinator insertions.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Rewrites allowed per reduction before it counts as divergent
    #[arg(long, default_value_t = Limits::default().max_steps)]
    max_steps: usize,
    /// Nesting allowed per reduction before it counts as divergent
    #[arg(long, default_value_t = Limits::default().max_nesting)]
    max_nesting: usize,
    /// Default number of insertions tried by :find
    #[arg(long, default_value_t = SearchConfig::default().max_depth)]
    depth: usize,
    /// Arguments applied to :find candidates
    #[arg(long, default_value = "ab")]
    args: String,
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
    /// Inputs to run instead of starting the REPL
    inputs: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(LevelFilter::from(args.log_level))
        .init();

    let fixed_args = parser::parse(&args.args)?;
    let mut session = Session {
        bindings: HashTrieMap::new(),
        args: fixed_args.elements().to_vec(),
        config: SearchConfig {
            max_depth: args.depth,
            limits: Limits {
                max_steps: args.max_steps,
                max_nesting: args.max_nesting,
            },
        },
    };

    if !args.inputs.is_empty() {
        for input in args.inputs {
            repl::Repl::evaluate(&mut session, input)?;
        }
        return Ok(());
    }
    println!("Hi, this is an SKI combinator REPL. :h to show help");
    println!();
    repl::start_repl(session)?;
    Ok(())
}
