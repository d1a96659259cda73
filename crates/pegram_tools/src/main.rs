//! peggrep: match lines of text against a PEG grammar.

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use pegram::RuleSet;
use pegram_tools::cli::{Cli, ColorMode, Commands, DumpFormat};
use pegram_tools::{colorize, tree_to_json};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Grep {
            rules,
            pattern,
            files,
            null_data,
            color,
        } => {
            let set = build_rules(&rules, &pattern)?;
            let use_color = match color {
                ColorMode::Always => true,
                ColorMode::Never => false,
                ColorMode::Auto => io::stdout().is_terminal(),
            };
            let delim = if null_data { 0 } else { b'\n' };
            if files.is_empty() {
                grep_reader(&set, io::stdin().lock(), delim, use_color)?;
            } else {
                for path in files {
                    let reader = BufReader::new(open(&path)?);
                    grep_reader(&set, reader, delim, use_color)?;
                }
            }
        }

        Commands::Dump {
            rules,
            pattern,
            input,
            raw,
            format,
        } => {
            let set = build_rules(&rules, &pattern)?;
            let text = match input {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let parsed = set.parse("main", &text);
            for warning in &parsed.warnings {
                eprintln!("warning: {warning}");
            }
            let Some(tree) = parsed.tree else {
                eprintln!("no match; deepest attempt reached byte {}:", parsed.last);
                eprintln!("\t{text}");
                eprintln!("\t{}^", " ".repeat(parsed.last));
                return Err("no match".into());
            };
            let tree = if raw { tree } else { tree.purge() };
            match format {
                DumpFormat::Text => {
                    print!("{}", tree.dump_with(ToString::to_string));
                }
                DumpFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&tree_to_json(&text, &tree))?);
                }
            }
        }
    }

    Ok(())
}

fn open(path: &PathBuf) -> Result<File, Box<dyn std::error::Error>> {
    File::open(path).map_err(|err| format!("failed opening {}: {err}", path.display()).into())
}

/// Compile the auxiliary rules plus the root pattern (as `main`),
/// rendering a caret under the offending column on syntax errors.
fn build_rules(rules: &[String], pattern: &str) -> Result<RuleSet, Box<dyn std::error::Error>> {
    let mut set = RuleSet::new();
    for rule in rules {
        let Some((name, definition)) = rule.split_once('=') else {
            return Err(format!("rule {rule:?} is not of the form NAME=DEFINITION").into());
        };
        add_rule(&mut set, name.trim(), definition)?;
    }
    add_rule(&mut set, "main", pattern)?;
    if !set.is_complete() {
        let missing: Vec<&str> = set.pending_names().collect();
        return Err(format!("undefined rules: {}", missing.join(", ")).into());
    }
    Ok(set)
}

fn add_rule(
    set: &mut RuleSet,
    name: &str,
    definition: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = set.add(name, definition) {
        eprintln!("error parsing rule {name}:");
        eprintln!("\t{definition}");
        eprintln!("\t{}^", " ".repeat(err.offset()));
        return Err(Box::new(err));
    }
    Ok(())
}

fn grep_reader<R: BufRead>(
    set: &RuleSet,
    reader: R,
    delim: u8,
    use_color: bool,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in reader.split(delim) {
        let record = record?;
        let line = String::from_utf8_lossy(&record);
        let parsed = set.parse("main", &line);
        for warning in &parsed.warnings {
            eprintln!("warning: {warning}");
        }
        let Some(tree) = parsed.tree else {
            continue;
        };
        if use_color {
            let purged = tree.purge();
            out.write_all(&colorize(&line, &purged))?;
            out.write_all(&line.as_bytes()[purged.end()..])?;
        } else {
            out.write_all(line.as_bytes())?;
        }
        out.write_all(&[delim])?;
    }
    Ok(())
}
