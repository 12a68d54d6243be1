/// Walkthrough — interactive shell for stepping through a gated story.
///
/// Usage: walkthrough [--flow <path>] [--content <path>] [--seed <n>]
///
/// Commands:
///   go <stage>      — request navigation to a stage
///   next            — advance to the next stage in the flow
///   answer <text>   — answer the lock riddle
///   choose <id>     — pick an option on a choice stage
///   tick <ms>       — move the clock forward
///   status          — show current stage, visited set, pending timers
///   stages          — list the flow order
///   restart         — wipe the session and return to the start
///   help            — list commands
///   quit            — exit

use std::io::{self, BufRead, Write};

use story_flow::core::gate::Decision;
use story_flow::core::presentation::{LockOutcome, Presentation};
use story_flow::core::session::SessionStore;
use story_flow::schema::stage::StageId;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_usage();
        return;
    }

    let mut flow_path = "story_data/anniversary/flow.ron".to_string();
    let mut content_path = "story_data/anniversary/content.ron".to_string();
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--flow" if i + 1 < args.len() => {
                i += 1;
                flow_path = args[i].clone();
            }
            "--content" if i + 1 < args.len() => {
                i += 1;
                content_path = args[i].clone();
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let presentation = Presentation::builder()
        .seed(seed)
        .flow_ron(&flow_path)
        .and_then(|b| b.content_ron(&content_path))
        .and_then(|b| b.build());

    let mut presentation = match presentation {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded flow with {} stages", presentation.flow().len());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");
    print_stage(&presentation);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("walkthrough> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "go" => {
                if parts.len() < 2 {
                    println!("Usage: go <stage>");
                    continue;
                }
                let target = StageId::from(parts[1]);
                report_decision(&presentation.goto(&target));
                print_stage(&presentation);
            }
            "next" => {
                report_decision(&presentation.next());
                print_stage(&presentation);
            }
            "answer" => {
                if parts.len() < 2 {
                    println!("Usage: answer <text>");
                    continue;
                }
                let attempt = parts[1..].join(" ");
                match presentation.submit_answer(&attempt) {
                    Ok(LockOutcome::Unlocked) => {
                        println!("Unlocked! 🎉 Advancing shortly; try 'tick 2000'.");
                    }
                    Ok(LockOutcome::Wrong { attempts, hint }) => {
                        println!(
                            "Wrong (attempt {}){}",
                            attempts,
                            hint.map(|h| format!(": {}", h)).unwrap_or_default()
                        );
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "choose" => {
                if parts.len() < 2 {
                    println!("Usage: choose <option-id>");
                    continue;
                }
                match presentation.choose(parts[1]) {
                    Ok(response) => {
                        println!("{}", response.message);
                        println!("(advancing shortly; try 'tick 2500')");
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "tick" => {
                let ms: u64 = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(100);
                let nav = presentation.tick(ms);
                if let Some(typewriter) = presentation.typewriter() {
                    if !typewriter.visible().is_empty() {
                        println!("{}", typewriter.visible());
                    }
                }
                if let Some(confetti) = presentation.confetti() {
                    println!("[{} confetti particles in the air]", confetti.particle_count());
                }
                if let Some(decision) = nav {
                    println!("(timer fired)");
                    report_decision(&decision);
                    print_stage(&presentation);
                }
            }
            "status" => {
                print_stage(&presentation);
                let visited: Vec<&str> =
                    presentation.visited().iter().map(|id| id.as_str()).collect();
                println!("Visited: {:?}", visited);
                println!("Pending timers: {}", presentation.pending_timers());
                println!("Clock: {} ms", presentation.now_ms());
            }
            "stages" => {
                for stage in presentation.flow().stages() {
                    let marker = if &stage.id == presentation.current_id() {
                        ">"
                    } else if presentation.visited().contains(&stage.id) {
                        "*"
                    } else {
                        " "
                    };
                    println!("  {} {} ({:?})", marker, stage.id, stage.kind);
                }
            }
            "restart" => {
                presentation.restart();
                println!("Session wiped.");
                print_stage(&presentation);
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for available commands.", cmd);
            }
        }
    }
}

fn report_decision(decision: &Decision) {
    match decision {
        Decision::Allow => println!("ALLOWED"),
        Decision::Redirect(to) => println!("DENIED — redirected to '{}'", to),
    }
}

fn print_stage<S: SessionStore>(presentation: &Presentation<S>) {
    let stage = presentation.current_stage();
    match &stage.title {
        Some(title) => println!("-- {} [{}] --", title, stage.id),
        None => println!("-- [{}] --", stage.id),
    }
}

fn print_usage() {
    println!("Walkthrough — interactive shell for stepping through a gated story.");
    println!();
    println!("Usage: walkthrough [--flow <path>] [--content <path>] [--seed <n>]");
    println!();
    println!("  --flow <path>     Flow order RON (default: story_data/anniversary/flow.ron)");
    println!("  --content <path>  Content pack RON (default: story_data/anniversary/content.ron)");
    println!("  --seed <n>        Effects RNG seed (default: 42)");
}

fn print_help() {
    println!("Commands:");
    println!("  go <stage>      Request navigation to a stage");
    println!("  next            Advance to the next stage in the flow");
    println!("  answer <text>   Answer the lock riddle");
    println!("  choose <id>     Pick an option on a choice stage");
    println!("  tick <ms>       Move the clock forward (default 100)");
    println!("  status          Show current stage, visited set, pending timers");
    println!("  stages          List the flow order");
    println!("  restart         Wipe the session and return to the start");
    println!("  help            Show this help");
    println!("  quit            Exit");
}
