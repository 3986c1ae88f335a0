use crate::advisor::Advice;
use crate::catalog::Catalog;
use crate::protocol::{ScoreBreakdown, SearchResult};
use std::io::{self, IsTerminal};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Notice shown when the local search comes back empty.
pub const NO_LOCAL_MATCH: &str = "No matching local records found.";

/// Colors are disabled for pipes and when NO_COLOR is set.
fn color_choice(is_terminal: bool) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() || !is_terminal {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(color_choice(io::stdout().is_terminal()))
}

pub fn stderr() -> StandardStream {
    StandardStream::stderr(color_choice(io::stderr().is_terminal()))
}

fn heading(out: &mut impl WriteColor, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Green)))?;
    writeln!(out, "{}", text)?;
    out.reset()
}

pub fn print_results(out: &mut impl WriteColor, results: &[SearchResult]) -> io::Result<()> {
    heading(out, "Retrieved Knowledge Base Records")?;

    if results.is_empty() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(out, "{}", NO_LOCAL_MATCH)?;
        return out.reset();
    }

    for (i, result) in results.iter().enumerate() {
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, "Result {}: {}", i + 1, result.question)?;
        out.reset()?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(out, " (Relevance: {:.2})", result.relevance)?;
        out.reset()?;
        writeln!(out, "  Answer: {}", result.answer)?;
    }
    Ok(())
}

pub fn print_scores(out: &mut impl WriteColor, scores: &[ScoreBreakdown]) -> io::Result<()> {
    heading(out, "Score breakdown")?;
    for score in scores {
        writeln!(
            out,
            "{:.4} = question {:.4} + answer {:.4} + keywords {:.4}  {}",
            score.relevance,
            score.question_score,
            score.answer_score,
            score.keyword_score,
            score.question
        )?;
        if !score.matched_keywords.is_empty() {
            writeln!(out, "         matched: {}", score.matched_keywords.join(", "))?;
        }
    }
    Ok(())
}

pub fn print_advice(out: &mut impl WriteColor, advice: &Advice) -> io::Result<()> {
    heading(out, "AI Expert Analysis")?;
    writeln!(out, "{}", advice.content.trim())?;

    if let Some(usage) = &advice.usage {
        writeln!(out)?;
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(
            out,
            "Model: {} | Prompt tokens: {} | Completion tokens: {} | Total tokens: {}",
            advice.model, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        )?;
        out.reset()?;
    }
    Ok(())
}

pub fn print_catalog(out: &mut impl WriteColor, catalog: &Catalog) -> io::Result<()> {
    for (i, record) in catalog.records().iter().enumerate() {
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, "{:>2}. {}", i + 1, record.question())?;
        out.reset()?;
        writeln!(out, "  [{}]", record.keywords().join(", "))?;
    }
    Ok(())
}

pub fn print_warning(out: &mut impl WriteColor, message: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Yellow)))?;
    write!(out, "warning:")?;
    out.reset()?;
    writeln!(out, " {}", message)
}

pub fn print_error(out: &mut impl WriteColor, message: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Red)))?;
    write!(out, "error:")?;
    out.reset()?;
    writeln!(out, " {}", message)
}
