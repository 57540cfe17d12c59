// crates/pgsolve-utree/src/render.rs

//! Diagnostics renderers: vertex-mapping CSV and an HTML/SVG picture of a
//! player's tree. Side outputs only; the engines never read these back.

use crate::agent::TreeAgent;
use crate::arena::{Arena, SlotId};
use anyhow::{Context, Result};
use pgsolve_core::{Player, Vertex};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the per-vertex tree-mapping CSV:
/// `vertex;even_sign;even_node;odd_sign;odd_node`.
pub fn write_mapping_csv<P: AsRef<Path>>(path: P, agent: &TreeAgent, n: usize) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    writeln!(w, "vertex;even_sign;even_node;odd_sign;odd_node")?;
    for v in 0..n as Vertex {
        let (es, esign) = agent.mapping(v, Player::Even);
        let (os, osign) = agent.mapping(v, Player::Odd);
        writeln!(
            w,
            "{v};{esign};{};{osign};{}",
            agent.signature(es),
            agent.signature(os)
        )?;
    }
    w.flush()?;
    Ok(())
}

const H_STEP: f32 = 15.0;
const V_STEP: f32 = 15.0;
const MARGIN: f32 = 8.0;

struct Layout {
    x: Vec<f32>,
    y: Vec<f32>,
}

/// Assign x positions to leaves left-to-right, center parents over their
/// kids, and derive y from the depth below the root.
fn layout(arena: &Arena, root: SlotId) -> (Layout, Vec<SlotId>, f32) {
    let mut lay = Layout {
        x: vec![-1.0; arena.pool_size()],
        y: vec![-1.0; arena.pool_size()],
    };
    let mut order = Vec::new();
    let mut next_leaf_x = MARGIN;

    // Post-order walk with an explicit stack; kids first, parent centered.
    let mut stack = vec![(root, 0usize, 0u32)];
    while let Some((id, kid_idx, depth)) = stack.pop() {
        let kids = &arena.slot(id).kids;
        if kid_idx < kids.len() {
            stack.push((id, kid_idx + 1, depth));
            stack.push((kids[kid_idx], 0, depth + 1));
            continue;
        }
        lay.y[id as usize] = MARGIN / 2.0 + depth as f32 * V_STEP;
        if kids.is_empty() {
            lay.x[id as usize] = next_leaf_x;
            next_leaf_x += H_STEP;
        } else {
            let sum: f32 = kids.iter().map(|&k| lay.x[k as usize]).sum();
            lay.x[id as usize] = sum / kids.len() as f32;
        }
        order.push(id);
    }
    (lay, order, next_leaf_x)
}

/// Render `pl`'s tree as SVG wrapped in a small HTML page.
pub fn write_tree_html<P: AsRef<Path>>(path: P, agent: &TreeAgent, pl: Player) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);

    let arena = agent.arena();
    let root = Arena::root(pl);
    let head = agent.head(pl);
    let (lay, order, width) = layout(arena, root);
    let depth = order
        .iter()
        .map(|&id| lay.y[id as usize])
        .fold(0.0f32, f32::max);

    writeln!(w, "<!DOCTYPE html>")?;
    writeln!(w, "<html>")?;
    writeln!(w, "<body>")?;
    writeln!(w, "<h1>{pl} tree</h1>")?;
    writeln!(
        w,
        "<svg width=\"{}mm\" height=\"{}mm\">",
        width + MARGIN,
        depth + MARGIN
    )?;
    for &id in &order {
        let (x, y) = (lay.x[id as usize], lay.y[id as usize]);
        for &kid in &arena.slot(id).kids {
            writeln!(
                w,
                "<line x1=\"{x}mm\" y1=\"{y}mm\" x2=\"{}mm\" y2=\"{}mm\" stroke=\"black\"/>",
                lay.x[kid as usize], lay.y[kid as usize]
            )?;
        }
        let fill = if id == head { "red" } else { "black" };
        writeln!(
            w,
            "<circle cx=\"{x}mm\" cy=\"{y}mm\" r=\"1mm\" fill=\"{fill}\"><title>{} [{}]</title></circle>",
            agent.signature(id),
            arena.slot(id).members.count()
        )?;
    }
    writeln!(w, "</svg>")?;
    writeln!(w, "</body>")?;
    writeln!(w, "</html>")?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_without_errors() {
        let mut a = TreeAgent::new(4, 2);
        a.init(Player::Even);
        a.init(Player::Odd);
        a.step_down(Player::Even).expect("down");
        a.step_right(Player::Even).expect("right");
        a.map_slice(Player::Even, crate::Sign::Mid, &[0, 3]);

        let dir = std::env::temp_dir().join("pgsolve-utree-render-test");
        std::fs::create_dir_all(&dir).expect("tmp dir");
        write_mapping_csv(dir.join("map.csv"), &a, 4).expect("csv");
        write_tree_html(dir.join("even.html"), &a, Player::Even).expect("html");

        let csv = std::fs::read_to_string(dir.join("map.csv")).expect("read csv");
        assert!(csv.starts_with("vertex;even_sign;even_node;odd_sign;odd_node"));
        assert!(csv.contains("0;mid;e,1;mid;o"));
        let html = std::fs::read_to_string(dir.join("even.html")).expect("read html");
        assert!(html.contains("<svg"));
        assert!(html.contains("fill=\"red\""));
    }
}
