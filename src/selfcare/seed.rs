//! Built-in activity catalog, inserted at startup with fixed ids.
//!
//! `INSERT OR IGNORE` keyed on the id makes re-seeding a no-op, and user
//! progress rows keep pointing at stable ids across restarts.

use anyhow::Result;

use crate::storage::Storage;

struct SeedActivity {
    id: i64,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    duration_minutes: i64,
    difficulty_level: &'static str,
    /// JSON array literals; stored verbatim in the TEXT columns.
    instructions: &'static str,
    benefits: &'static str,
    mood_tags: &'static str,
    icon_name: &'static str,
}

const ACTIVITIES: &[SeedActivity] = &[
    SeedActivity {
        id: 1,
        title: "Box Breathing",
        description: "A simple breathing pattern used to settle the nervous system in a few minutes.",
        category: "breathing",
        duration_minutes: 5,
        difficulty_level: "beginner",
        instructions: r#"["Sit comfortably and close your eyes","Inhale through your nose for 4 seconds","Hold your breath for 4 seconds","Exhale slowly for 4 seconds","Hold empty for 4 seconds, then repeat"]"#,
        benefits: r#"["Lowers heart rate","Reduces acute anxiety","Improves focus"]"#,
        mood_tags: r#"["anxious","stressed","overwhelmed"]"#,
        icon_name: "wind",
    },
    SeedActivity {
        id: 2,
        title: "5-4-3-2-1 Grounding",
        description: "Anchor yourself in the present by walking through your five senses.",
        category: "mindfulness",
        duration_minutes: 5,
        difficulty_level: "beginner",
        instructions: r#"["Name 5 things you can see","Name 4 things you can touch","Name 3 things you can hear","Name 2 things you can smell","Name 1 thing you can taste"]"#,
        benefits: r#"["Interrupts spiraling thoughts","Brings attention to the present"]"#,
        mood_tags: r#"["anxious","panicked","overwhelmed"]"#,
        icon_name: "anchor",
    },
    SeedActivity {
        id: 3,
        title: "Gratitude List",
        description: "Write down three things you are grateful for today, however small.",
        category: "reflection",
        duration_minutes: 10,
        difficulty_level: "beginner",
        instructions: r#"["Find a quiet spot","Write down three things you are grateful for","For each one, note why it matters to you"]"#,
        benefits: r#"["Shifts attention toward positives","Builds a reflective habit"]"#,
        mood_tags: r#"["sad","low","neutral"]"#,
        icon_name: "heart",
    },
    SeedActivity {
        id: 4,
        title: "Ten Minute Walk",
        description: "A short walk outside, no destination required.",
        category: "movement",
        duration_minutes: 10,
        difficulty_level: "beginner",
        instructions: r#"["Step outside","Walk at a comfortable pace","Notice your surroundings rather than your phone"]"#,
        benefits: r#"["Light exercise","Daylight exposure","Break from screens"]"#,
        mood_tags: r#"["restless","low","stressed"]"#,
        icon_name: "footprints",
    },
    SeedActivity {
        id: 5,
        title: "Body Scan",
        description: "Move attention slowly from head to toe, releasing tension as you go.",
        category: "mindfulness",
        duration_minutes: 15,
        difficulty_level: "intermediate",
        instructions: r#"["Lie down or sit comfortably","Close your eyes and take three slow breaths","Bring attention to the top of your head","Move attention slowly downward, part by part","Where you find tension, breathe into it and let it soften"]"#,
        benefits: r#"["Releases physical tension","Improves body awareness","Helps with sleep"]"#,
        mood_tags: r#"["tense","tired","stressed"]"#,
        icon_name: "scan",
    },
    SeedActivity {
        id: 6,
        title: "Digital Sunset",
        description: "Put all screens away for the last hour before bed.",
        category: "sleep",
        duration_minutes: 60,
        difficulty_level: "intermediate",
        instructions: r#"["Pick a cutoff time one hour before bed","Charge your phone outside the bedroom","Replace scrolling with reading or stretching"]"#,
        benefits: r#"["Better sleep quality","Less late-night rumination"]"#,
        mood_tags: r#"["tired","wired","restless"]"#,
        icon_name: "moon",
    },
    SeedActivity {
        id: 7,
        title: "Loving-Kindness Practice",
        description: "Direct short phrases of goodwill toward yourself and others.",
        category: "mindfulness",
        duration_minutes: 10,
        difficulty_level: "intermediate",
        instructions: r#"["Sit quietly and bring yourself to mind","Repeat: may I be safe, may I be well, may I be at ease","Bring a loved one to mind and repeat the phrases for them","Extend the phrases to someone neutral, then to everyone"]"#,
        benefits: r#"["Softens self-criticism","Builds warmth toward others"]"#,
        mood_tags: r#"["lonely","sad","self-critical"]"#,
        icon_name: "sun",
    },
    SeedActivity {
        id: 8,
        title: "Declutter One Surface",
        description: "Clear a single desk, shelf, or countertop. Just one.",
        category: "environment",
        duration_minutes: 15,
        difficulty_level: "beginner",
        instructions: r#"["Pick one visible surface","Remove everything that does not belong","Wipe it down","Put back only what you use"]"#,
        benefits: r#"["Visible progress fast","Calmer workspace"]"#,
        mood_tags: r#"["overwhelmed","restless","stuck"]"#,
        icon_name: "sparkles",
    },
    SeedActivity {
        id: 9,
        title: "Reach Out to a Friend",
        description: "Send a message to someone you have not talked to in a while.",
        category: "connection",
        duration_minutes: 10,
        difficulty_level: "intermediate",
        instructions: r#"["Think of someone you miss","Send a short, honest message","No agenda needed, just say hello"]"#,
        benefits: r#"["Counters isolation","Strengthens relationships"]"#,
        mood_tags: r#"["lonely","sad","low"]"#,
        icon_name: "message-circle",
    },
    SeedActivity {
        id: 10,
        title: "Progressive Muscle Relaxation",
        description: "Tense and release muscle groups one at a time, from feet to face.",
        category: "breathing",
        duration_minutes: 20,
        difficulty_level: "advanced",
        instructions: r#"["Lie down somewhere quiet","Tense your feet for 5 seconds, then release","Move upward through legs, stomach, hands, arms, shoulders, face","Notice the difference between tension and release","Finish with three slow breaths"]"#,
        benefits: r#"["Deep physical relaxation","Useful before sleep","Reduces chronic tension"]"#,
        mood_tags: r#"["tense","anxious","tired"]"#,
        icon_name: "waves",
    },
];

/// Insert the built-in catalog. Idempotent; called once at startup.
pub async fn seed_catalog(storage: &Storage) -> Result<()> {
    for a in ACTIVITIES {
        storage
            .seed_activity(
                a.id,
                a.title,
                a.description,
                a.category,
                a.duration_minutes,
                a.difficulty_level,
                a.instructions,
                a.benefits,
                a.mood_tags,
                Some(a.icon_name),
            )
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for a in ACTIVITIES {
            assert!(seen.insert(a.id), "duplicate seed id {}", a.id);
        }
    }

    #[test]
    fn seed_json_fields_parse() {
        for a in ACTIVITIES {
            for raw in [a.instructions, a.benefits, a.mood_tags] {
                let parsed: Vec<String> = serde_json::from_str(raw).unwrap();
                assert!(!parsed.is_empty());
            }
        }
    }
}
