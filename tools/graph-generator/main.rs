use clap::Parser;
use kensa::graph::kind::{BATCH_ASSIGN_VALUE, END, SELECTOR, START, VARIABLE_DEF};
use kensa::prelude::*;
use kensa::wire;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::fs;

/// A CLI tool to generate workflow graphs with stale variable references for kensa
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_workflow.json")]
    output: String,

    /// Number of variables declared by the definition node
    #[arg(long, default_value_t = 3)]
    variables: usize,

    /// Number of batch assignment nodes in the chain
    #[arg(long, default_value_t = 4)]
    assignments: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.variables == 0 {
        eprintln!("Error: --variables must be at least 1");
        std::process::exit(1);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    println!(
        "Generating workflow ({} variables, {} assignment nodes)...",
        cli.variables, cli.assignments
    );

    let graph = generate_chain(&mut rng, cli.variables, cli.assignments);
    let json_output = wire::to_json_string_pretty(&graph)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} nodes and saved them to '{}'",
        graph.nodes.len(),
        cli.output
    );

    Ok(())
}

/// Builds `start -> variableDef -> batchAssignValue* -> selector -> end`.
///
/// Every read points at the definition node, which goes stale as soon as an assignment node
/// rewrites the variable.
fn generate_chain(rng: &mut StdRng, variables: usize, assignments: usize) -> WorkflowGraph {
    let definition_id = "def";
    let stale_code = kensa::graph::node_code(VARIABLE_DEF, definition_id);
    let codes: Vec<String> = (0..variables).map(|i| format!("var{}", i)).collect();

    let read = |rng: &mut StdRng| {
        let code = &codes[rng.random_range(0..codes.len())];
        Expression::node_variable(
            stale_code.clone(),
            code.clone(),
            kensa::graph::conventional_id(definition_id, code),
        )
    };

    let mut nodes = vec![Node::new("start", START)];

    let mut definition = Node::new(definition_id, VARIABLE_DEF).with_name("Declare variables");
    for code in &codes {
        definition = definition.with_output_param(
            VariableBinding::conventional(definition_id, code.clone()).with_type(json!("integer")),
        );
    }
    nodes.push(definition);

    for i in 0..assignments {
        let mut items = Vec::new();
        for _ in 0..rng.random_range(1..=2) {
            let rhs = if rng.random_bool(0.5) {
                read(&mut *rng)
            } else {
                Expression::literal("integerConst", json!(rng.random_range(0..100)))
            };
            items.push(Property::record([
                ("leftExpress", Property::Expression(read(&mut *rng))),
                ("rightExpress", Property::Expression(rhs)),
            ]));
        }
        nodes.push(
            Node::new(format!("assign{}", i), BATCH_ASSIGN_VALUE)
                .with_property("expresses", Property::List(items)),
        );
    }

    let condition = Expression::compare("equal", read(&mut *rng), Expression::literal("integerConst", json!(0)));
    nodes.push(Node::new("choose", SELECTOR).with_property(
        "branches",
        Property::List(vec![Property::record([(
            "conditionExpr",
            Property::Expression(condition),
        )])]),
    ));

    let mut end = Node::new("end", END);
    for code in &codes {
        let reference = Expression::node_variable(
            stale_code.clone(),
            code.clone(),
            kensa::graph::conventional_id(definition_id, code),
        );
        end = end.with_input_param(
            VariableBinding::conventional("end", format!("out_{}", code)).with_value_expr(reference),
        );
    }
    nodes.push(end);

    let edges = nodes
        .windows(2)
        .map(|pair| Edge::new(pair[0].id.clone(), pair[1].id.clone()))
        .collect();
    WorkflowGraph::new(nodes, edges)
}
