/// Anniversary demo — a scripted run of the full gated narrative.
///
/// Walks the shipped anniversary pack end to end: a blocked deep link,
/// the riddle with its hint ladder, typewriter-revealed story pages, the
/// timeline, both choice quizzes with their timed advances, the finale
/// confetti show, and a restart.
///
/// Run with: cargo run --example anniversary

use chrono::NaiveDate;
use story_flow::core::gate::Decision;
use story_flow::core::presentation::{LockOutcome, Presentation};
use story_flow::schema::stage::StageId;

fn main() {
    let mut show = Presentation::builder()
        .seed(42)
        .template("anniversary")
        .and_then(|b| b.build())
        .expect("anniversary pack should load");

    banner("A deep link is refused");
    let decision = show.goto(&StageId::from("finale"));
    report(&decision);
    println!("Back at '{}'.\n", show.current_id());

    banner("Intro");
    // let the typewriter spell the title out
    while !show.typewriter().map(|t| t.is_done()).unwrap_or(true) {
        show.tick(200);
    }
    if let Some(t) = show.typewriter() {
        println!("{}", t.visible());
    }
    println!("{}\n", show.content().intro.subtitle);

    banner("The lock");
    show.next();
    for attempt in ["athens", "kifisia", "chalandri"] {
        match show.submit_answer(attempt).expect("on the lock stage") {
            LockOutcome::Unlocked => {
                println!("'{}' — correct! 🎉", attempt);
            }
            LockOutcome::Wrong { attempts, hint } => {
                println!(
                    "'{}' — wrong (attempt {}). {}",
                    attempt,
                    attempts,
                    hint.unwrap_or_default()
                );
            }
        }
    }
    // the unlock delay passes and the flow moves on by itself
    show.tick(2000);
    println!("...and we are through, on '{}'.\n", show.current_id());

    banner("Story pages");
    for _ in 0..2 {
        while !show.typewriter().map(|t| t.is_done()).unwrap_or(true) {
            show.tick(500);
        }
        if let Some(t) = show.typewriter() {
            println!("{}", t.visible());
        }
        show.next();
    }
    println!();

    banner("The timeline");
    for goal in &show.content().timeline_goals {
        println!("  {} {}", goal.icon, goal.text);
    }
    show.next();
    println!();

    banner("Choices");
    for pick in ["apologize", "hug"] {
        let prompt = match show.current_stage().kind {
            story_flow::schema::stage::StageKind::Choice(i) => {
                show.content().choices[i].prompt.clone()
            }
            _ => String::new(),
        };
        println!("{}", prompt);
        let message = show.choose(pick).expect("valid option").message.clone();
        println!("  -> {} {}", pick, message);
        // the response lingers, then the flow advances
        show.tick(2500);
    }
    println!();

    banner("Finale");
    println!("{}", show.content().finale.message);
    if let Some(sub) = &show.content().finale.submessage {
        println!("{}", sub);
    }
    let today = NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date");
    if let Some(days) = show
        .content()
        .finale
        .days_together(today)
        .expect("valid start date")
    {
        println!("{} days together.", days);
    }
    for frame in 0..4 {
        show.tick(250);
        let count = show.confetti().map(|c| c.particle_count()).unwrap_or(0);
        println!("  t={}ms: {} confetti particles", (frame + 1) * 250, count);
    }
    for image in &show.content().finale.gallery {
        println!("  [photo] {}", image.caption);
    }
    println!();

    banner("Start over");
    show.restart();
    println!("Session wiped; back at '{}'.", show.current_id());
    let denied = show.goto(&StageId::from("story-2"));
    report(&denied);
}

fn banner(title: &str) {
    println!("=== {} ===", title);
}

fn report(decision: &Decision) {
    match decision {
        Decision::Allow => println!("allowed"),
        Decision::Redirect(to) => println!("denied, redirected to '{}'", to),
    }
}
