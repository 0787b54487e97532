//! parse command - Show how an expression is read

use anyhow::{Context as _, Result};

use super::Context;
use crate::expr::{parse_expression, Operator};
use crate::ui::output;

/// Parse `expression` and print its canonical form and steps.
pub fn parse(ctx: &Context, expression: &str) -> Result<()> {
    let expr = parse_expression(expression)
        .with_context(|| format!("Invalid expression '{}'", expression))?;

    output::print(&expr, ctx.verbosity);
    output::print(
        format!("  repository {}", expr.root_term()),
        ctx.verbosity,
    );
    for op in expr.operations() {
        let kind = match op.operator {
            Operator::Edit => "edit",
            Operator::Translate => "translate",
        };
        output::print(format!("  {:<10} {}", kind, op.term), ctx.verbosity);
    }
    Ok(())
}
