#![no_main]

//! Fuzz target for the reordering strategies over structured block graphs.

use declfix_domain::{ProcessConfig, process_source};
use libfuzzer_sys::fuzz_target;

const NAMES: [&str; 6] = ["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot"];

#[derive(Debug, arbitrary::Arbitrary)]
struct GraphInput {
    /// Per block (by index into NAMES), the indices it references.
    edges: Vec<(u8, Vec<u8>)>,
    max_passes: u8,
    use_scc: bool,
}

fn render(input: &GraphInput) -> String {
    let mut out = String::from("from pydantic import BaseModel\n\n\n");
    for (idx, refs) in input.edges.iter().take(NAMES.len()) {
        let name = NAMES[*idx as usize % NAMES.len()];
        out.push_str(&format!("class {name}(BaseModel):\n"));
        if refs.is_empty() {
            out.push_str("    id: str\n");
        }
        for r in refs.iter().take(4) {
            let target = NAMES[*r as usize % NAMES.len()];
            out.push_str(&format!("    f_{}: Optional[{target}] = None\n", target.to_lowercase()));
        }
        out.push_str("\n\n");
    }
    out
}

fuzz_target!(|input: GraphInput| {
    let text = render(&input);
    let config = ProcessConfig {
        strategy: if input.use_scc { "scc" } else { "window" }.to_string(),
        max_passes: u64::from(input.max_passes),
        ..ProcessConfig::default()
    };
    if let Ok(outcome) = process_source(&text, &config) {
        let before = text.matches("\nclass ").count();
        let after = outcome.text.matches("\nclass ").count();
        assert!(after <= before, "reordering must not invent blocks");
    }
});
