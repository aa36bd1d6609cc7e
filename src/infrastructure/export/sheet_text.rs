//! Plain-text character sheet

use crate::domain::entities::{AbilityScores, CharacterTemplate};

fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Render a human-readable sheet; not meant to be parsed back
pub fn render_character_sheet(template: &CharacterTemplate) -> String {
    let mut sheet_text = String::new();

    // Header
    sheet_text.push_str(&format!("{}\n", template.name));
    sheet_text.push_str(&format!(
        "{}\n",
        "=".repeat(template.name.chars().count().max(1))
    ));
    match template.level {
        Some(level) => sheet_text.push_str(&format!(
            "Type: {} (level {})\n",
            template.category, level
        )),
        None => sheet_text.push_str(&format!("Type: {}\n", template.category)),
    }
    sheet_text.push_str(&format!("Hit Points: {}\n", template.max_hp));
    sheet_text.push_str(&format!("Armor Class: {}\n", template.armor_class));
    sheet_text.push_str(&format!(
        "Initiative: {}\n",
        signed(template.dexterity_modifier)
    ));

    if let Some(sheet) = &template.sheet {
        if let Some(size) = &sheet.size {
            sheet_text.push_str(&format!("Size: {}\n", size));
        }
        if let Some(speed) = &sheet.speed {
            sheet_text.push_str(&format!("Speed: {}\n", speed));
        }

        // Ability block
        let a = &sheet.abilities;
        sheet_text.push('\n');
        for (label, score) in [
            ("STR", a.strength),
            ("DEX", a.dexterity),
            ("CON", a.constitution),
            ("INT", a.intelligence),
            ("WIS", a.wisdom),
            ("CHA", a.charisma),
        ] {
            sheet_text.push_str(&format!(
                "{} {:>2} ({})\n",
                label,
                score,
                signed(AbilityScores::modifier(score))
            ));
        }

        if !sheet.skills.is_empty() {
            sheet_text.push_str("\nSkills:\n");
            for skill in &sheet.skills {
                sheet_text.push_str(&format!("  {} {}\n", skill.name, signed(skill.bonus)));
            }
        }

        if !sheet.equipment.is_empty() {
            sheet_text.push_str("\nEquipment:\n");
            for item in &sheet.equipment {
                sheet_text.push_str(&format!("  - {}\n", item));
            }
        }
    }

    if !template.notes.trim().is_empty() {
        sheet_text.push_str(&format!("\nNotes:\n{}\n", template.notes.trim()));
    }

    sheet_text
}
