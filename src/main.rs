use anyhow::Result;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use innings_story::data::{load_dataset, DataSource};
use innings_story::logging::{log, obj, v_str, Domain, Level};
use innings_story::narrative::tooltip;
use innings_story::session::{Command, Outcome, StorySession};
use innings_story::state::Config;

fn print_json(value: &serde_json::Value) {
    println!("{}", value);
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cfg = Config::from_env();
    if let Some(location) = std::env::args().nth(1) {
        cfg.data_location = location;
    }
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[("data", v_str(&cfg.data_location)), ("start_act", json!(cfg.start_act))]),
    );

    let mut session = StorySession::new(cfg.start_act);
    let source = DataSource::parse(&cfg.data_location);
    let dataset = load_dataset(&source).await?;
    let first = session.finish_loading(dataset).clone();
    print_json(&json!({ "summary": first, "scene": session.scene() }));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "quit" | "exit" | "q" => break,
            "show" => {
                if let Some(view) = session.view() {
                    print_json(&json!(view));
                }
                continue;
            }
            "scene" => {
                print_json(&json!(session.scene()));
                continue;
            }
            _ => {}
        }
        if let Some(rest) = line.strip_prefix("tip ") {
            let picked = rest.trim().parse::<usize>().ok().and_then(|i| {
                let view = session.view()?;
                let point = view.points.get(i)?;
                Some(tooltip(point.record, &session.state().filters))
            });
            match picked {
                Some(t) => print_json(&json!(t)),
                None => print_json(&json!({ "error": format!("no point at {:?}", rest.trim()) })),
            }
            continue;
        }

        let command = match Command::parse(line) {
            Ok(c) => c,
            Err(err) => {
                print_json(&json!({ "error": err.to_string() }));
                continue;
            }
        };
        let outcome = session.apply(command);
        if cfg.echo_view || outcome == Outcome::Changed {
            print_json(&json!({
                "outcome": outcome,
                "state": session.state(),
                "summary": session.summary(),
            }));
        }
    }

    log(Level::Info, Domain::System, "shutdown", obj(&[("act", json!(session.state().act))]));
    Ok(())
}
