//! Rendering of the guard's transition table for documentation.
//!
//! The table is constant data, so these routines have no runtime dependency
//! on any guard: they exist so the drawn graph and the running state machine
//! can never drift apart.

use core::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::guard::{Action, Edge, Goal, GOALS, TRANSITION_TABLE};
use crate::mode::{Mode, MODES, MODE_COUNT};

/// Which access family a rendered graph highlights.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Highlight {
    /// Highlight the read goals: begin-read in green, end-read in red.
    Read,
    /// Highlight the write goals: begin-write in green, end-write in red.
    Write,
}

impl Highlight {
    /// The uppercase goal lexeme the highlight matches against.
    const fn target(self) -> char {
        match self {
            Highlight::Read => 'R',
            Highlight::Write => 'W',
        }
    }
}

struct EdgeStyle {
    edge_color: &'static str,
    edge_style: &'static str,
    font_color: &'static str,
}

fn style(highlight: Highlight, goal: Goal) -> EdgeStyle {
    let target: char = highlight.target();
    let name: char = goal.lexeme();
    if target == name {
        EdgeStyle {
            edge_color: "limegreen",
            edge_style: ", style=bold",
            font_color: "darkgreen",
        }
    } else if target == name.to_ascii_uppercase() {
        EdgeStyle {
            edge_color: "orangered",
            edge_style: ", style=bold",
            font_color: "crimson",
        }
    } else {
        EdgeStyle {
            edge_color: "gray80",
            edge_style: "",
            font_color: "gray70",
        }
    }
}

/// Node placement on a fixed grid, drain modes above, entry modes below.
const NODE_GRID: [(Mode, u32, u32); 6] = [
    (Mode::FinishingMany, 1, 1),
    (Mode::ReadingMany, 2, 1),
    (Mode::FinishingOne, 1, 2),
    (Mode::ReadingOne, 2, 2),
    (Mode::Idle, 1, 3),
    (Mode::Writing, 2, 3),
];

const FIG_SIZE: f64 = 12.0;
const TITLE_FONT_SIZE: u32 = 20;
const EDGE_FONT_SIZE: u32 = 14;
const NODE_COLOR: &str = "yellow";

/// Render the transition table as a GraphViz digraph highlighting one access
/// family.
///
/// Every user-facing mode becomes a node and every defined table entry
/// becomes exactly one edge. Edge labels carry the goal lexeme, the
/// reader-count action when there is one, and a `*` marker on edges that do
/// not yet satisfy their goal.
pub fn render_transition_graph(highlight: Highlight) -> String {
    let mut out: String = String::new();
    let _ = writeln!(out, " digraph Fluid {{");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "   graph [ label=\"Finite State Graph {}\", labelloc=t, fontsize={TITLE_FONT_SIZE}, labeldistance=2 ]",
        highlight.target()
    );
    let _ = writeln!(
        out,
        "   edge  [ color=gray40, labelfontcolor=gray20, labeldistance=0.5 ]"
    );
    let _ = writeln!(out, "   size = \"{FIG_SIZE},{FIG_SIZE}\";");

    for (mode, col, row) in NODE_GRID {
        let _ = writeln!(
            out,
            "   {:<3} [shape=circle pos=\"{col},{row}!\", style=filled, fillcolor={NODE_COLOR}]",
            mode.lexeme()
        );
    }

    for goal in GOALS {
        let attr: EdgeStyle = style(highlight, goal);
        for from in MODES {
            let edge: &Edge = TRANSITION_TABLE.edge(goal, from);
            if edge.into == Mode::Undefined {
                continue;
            }
            let mut label: String = goal.lexeme().to_string();
            if edge.action != Action::Keep {
                label.push(edge.action.lexeme());
            }
            if !edge.finish {
                label.push('*');
            }
            let _ = writeln!(
                out,
                "   {:<3} -> {:<3} [ color={}{}, label=\"{label}\", fontsize={EDGE_FONT_SIZE}, fontcolor={}, labeldistance=0.5 ]",
                from.lexeme(),
                edge.into.lexeme(),
                attr.edge_color,
                attr.edge_style,
                attr.font_color
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, " }}");
    out
}

/// Write one `.dot` file per highlight into `dir`:
/// `fluid-transition.R.dot` and `fluid-transition.W.dot`.
pub fn write_transition_graphs(dir: impl AsRef<Path>) -> io::Result<()> {
    for highlight in [Highlight::Read, Highlight::Write] {
        let path = dir
            .as_ref()
            .join(format!("fluid-transition.{}.dot", highlight.target()));
        fs::write(path, render_transition_graph(highlight))?;
    }
    Ok(())
}

/// Render the transition table as plain text: one line per defined edge plus
/// inbound/outbound degree counts per mode.
pub fn table_summary() -> String {
    let mut inbound: [u32; MODE_COUNT] = [0; MODE_COUNT];
    let mut outbound: [u32; MODE_COUNT] = [0; MODE_COUNT];

    let mut out: String = String::new();
    let _ = writeln!(out, "Transition table of the state machines:");
    for goal in GOALS {
        for from in MODES {
            let edge: &Edge = TRANSITION_TABLE.edge(goal, from);
            if edge.into == Mode::Undefined {
                continue;
            }
            let _ = writeln!(
                out,
                "   {} : {} -> {} [{}] {}",
                goal.lexeme(),
                from.lexeme(),
                edge.into.lexeme(),
                edge.action.lexeme(),
                if edge.finish { 'T' } else { 'C' }
            );
            outbound[from as usize] += 1;
            inbound[edge.into as usize] += 1;
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "State statistics:");
    for mode in MODES {
        let _ = writeln!(
            out,
            "   {} : {} inbound, {} outbound",
            mode.lexeme(),
            inbound[mode as usize],
            outbound[mode as usize]
        );
    }
    out
}
