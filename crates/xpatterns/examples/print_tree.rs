//! Type check a small expression and print the rewritten tree.
//!
//! Usage: `xpatterns_print_tree <sequence-type>`. The expression is
//! `fn:round($input treat as <sequence-type>)` with `$input` declared as `item()*`.

use xpatterns::engine::runtime::StaticContextBuilder;
use xpatterns::expr::{NumericFunction, TreatAs};
use xpatterns::types::common;
use xpatterns::{ExpandedName, Expr, compile};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: xpatterns_print_tree <sequence-type>");
        std::process::exit(2);
    }
    let ctx = StaticContextBuilder::new()
        .with_variable(ExpandedName::local("input"), common::ZERO_OR_MORE_ITEMS.clone())
        .build();
    let asserted = match args[1].parse() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let expr = NumericFunction::round(
        TreatAs::new(Expr::variable(ExpandedName::local("input")), asserted).into(),
    );
    match compile(expr.into(), &ctx) {
        Ok(c) => print!("{}", c.expr()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
