use serde::{Deserialize, Serialize};
use std::fmt;

/// A creature owned by the player.
///
/// Field names on the wire match the saved-progress format (`caughtDate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    pub id: u32,
    pub name: String,
    /// Official artwork URL; PokeAPI reports `null` for a handful of forms.
    pub sprite: Option<String>,
    pub caught_date: String,
}

impl Creature {
    /// Build the evolved form of `self`: identity and sprite come from the
    /// new stage, the catch date is kept.
    pub fn evolved_into(&self, id: u32, name: String, sprite: Option<String>) -> Self {
        Self {
            id,
            name,
            sprite,
            caught_date: self.caught_date.clone(),
        }
    }
}

impl fmt::Display for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // Pokedex card layout
            writeln!(f, "#{:03} {}", self.id, self.name)?;
            write!(f, "Caught: {}", self.caught_date)
        } else {
            write!(f, "{} (#{:03})", self.name, self.id)
        }
    }
}

/// One node of an evolution tree. Children keep the order the data source
/// reported them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionChainNode {
    pub species_name: String,
    pub children: Vec<EvolutionChainNode>,
}

impl EvolutionChainNode {
    pub fn leaf(species_name: impl Into<String>) -> Self {
        Self {
            species_name: species_name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(species_name: impl Into<String>, children: Vec<EvolutionChainNode>) -> Self {
        Self {
            species_name: species_name.into(),
            children,
        }
    }

    /// Builds a straight line `a -> b -> c`. Returns `None` for an empty slice.
    pub fn linear(names: &[&str]) -> Option<Self> {
        let (last, rest) = names.split_last()?;
        let mut node = Self::leaf(*last);
        for name in rest.iter().rev() {
            node = Self::with_children(*name, vec![node]);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creature_uses_saved_progress_keys() {
        let creature = Creature {
            id: 25,
            name: "pikachu".to_string(),
            sprite: Some("https://img/25.png".to_string()),
            caught_date: "3/7/2025".to_string(),
        };

        let json = serde_json::to_value(&creature).unwrap();
        assert_eq!(json["caughtDate"], "3/7/2025");
        assert_eq!(json["sprite"], "https://img/25.png");
        assert_eq!(json["id"], 25);
    }

    #[test]
    fn test_null_sprite_is_accepted() {
        let creature: Creature = serde_json::from_str(
            r#"{"id":1,"name":"bulbasaur","sprite":null,"caughtDate":"1/1/2025"}"#,
        )
        .unwrap();
        assert_eq!(creature.sprite, None);
    }

    #[test]
    fn test_evolved_into_keeps_caught_date() {
        let charmander = Creature {
            id: 4,
            name: "charmander".to_string(),
            sprite: None,
            caught_date: "12/5/2024".to_string(),
        };
        let charmeleon = charmander.evolved_into(5, "charmeleon".to_string(), None);
        assert_eq!(charmeleon.id, 5);
        assert_eq!(charmeleon.name, "charmeleon");
        assert_eq!(charmeleon.caught_date, "12/5/2024");
    }

    #[test]
    fn test_linear_chain() {
        let chain = EvolutionChainNode::linear(&["a", "b", "c"]).unwrap();
        assert_eq!(chain.species_name, "a");
        assert_eq!(chain.children[0].species_name, "b");
        assert_eq!(chain.children[0].children[0].species_name, "c");
        assert!(chain.children[0].children[0].children.is_empty());
        assert!(EvolutionChainNode::linear(&[]).is_none());
    }

    #[test]
    fn test_display() {
        let creature = Creature {
            id: 7,
            name: "squirtle".to_string(),
            sprite: None,
            caught_date: "9/9/2025".to_string(),
        };
        assert_eq!(format!("{}", creature), "squirtle (#007)");
        assert_eq!(format!("{:#}", creature), "#007 squirtle\nCaught: 9/9/2025");
    }
}
