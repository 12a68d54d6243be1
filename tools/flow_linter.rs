/// Flow Linter — validates a flow order against its content pack.
///
/// Usage: flow_linter <flow.ron> <content.ron>

use std::collections::HashSet;
use std::path::Path;
use std::process;

use story_flow::schema::content::StoryContent;
use story_flow::schema::stage::{FlowOrder, StageKind};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: flow_linter <flow.ron> <content.ron>");
        process::exit(0);
    }

    let flow = match FlowOrder::load_from_ron(Path::new(&args[1])) {
        Ok(flow) => flow,
        Err(e) => {
            eprintln!("ERROR: failed to load flow '{}': {}", args[1], e);
            process::exit(1);
        }
    };

    let content = match StoryContent::load_from_ron(Path::new(&args[2])) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("ERROR: failed to load content '{}': {}", args[2], e);
            process::exit(1);
        }
    };

    println!("Loaded flow with {} stages", flow.len());

    let (errors, warnings) = lint(&flow, &content);

    println!("\n=== Flow Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint(flow: &FlowOrder, content: &StoryContent) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut used_stories = HashSet::new();
    let mut used_choices = HashSet::new();
    let mut has_lock = false;
    let mut has_finale = false;

    for (pos, stage) in flow.stages().iter().enumerate() {
        match &stage.kind {
            StageKind::Story(i) => {
                used_stories.insert(*i);
                if *i >= content.stories.len() {
                    errors.push(format!(
                        "stage '{}' references story page {} but the pack has {}",
                        stage.id,
                        i,
                        content.stories.len()
                    ));
                }
            }
            StageKind::Choice(i) => {
                used_choices.insert(*i);
                if *i >= content.choices.len() {
                    errors.push(format!(
                        "stage '{}' references choice prompt {} but the pack has {}",
                        stage.id,
                        i,
                        content.choices.len()
                    ));
                }
            }
            StageKind::Lock => has_lock = true,
            StageKind::Finale => has_finale = true,
            _ => {}
        }

        if stage.auto_advance_ms.is_some() && pos + 1 == flow.len() {
            warnings.push(format!(
                "stage '{}' auto-advances but is the last stage (nothing to advance to)",
                stage.id
            ));
        }
    }

    if has_lock {
        if content.lock.answer.trim().is_empty() {
            errors.push("lock stage present but the lock answer is empty".to_string());
        }
        if content.lock.hints.is_empty() {
            warnings.push(
                "lock has no hints; wrong attempts will get no feedback".to_string(),
            );
        }
    }

    if !has_finale {
        warnings.push("flow has no finale stage".to_string());
    }

    for (i, choice) in content.choices.iter().enumerate() {
        if choice.options.len() < 2 {
            warnings.push(format!(
                "choice prompt {} ('{}') has only {} option(s)",
                i,
                choice.prompt,
                choice.options.len()
            ));
        }
        let mut option_ids = HashSet::new();
        for option in &choice.options {
            if !option_ids.insert(option.id.as_str()) {
                errors.push(format!(
                    "choice prompt {} has duplicate option id '{}'",
                    i, option.id
                ));
            }
        }
        if !used_choices.contains(&i) {
            warnings.push(format!(
                "choice prompt {} ('{}') is not referenced by any stage",
                i, choice.prompt
            ));
        }
    }

    for i in 0..content.stories.len() {
        if !used_stories.contains(&i) {
            warnings.push(format!("story page {} is not referenced by any stage", i));
        }
    }

    (errors, warnings)
}
