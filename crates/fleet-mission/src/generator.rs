//! Seeded random fleet generation from mission templates.
//!
//! A template is a string of action codes: `"LP"` means load somewhere, then
//! park.  Each truck gets a template drawn uniformly from the list, and each
//! action draws its target from the matching candidate list:
//!
//! | Code | Kind     | Target drawn from         |
//! |------|----------|---------------------------|
//! | `L`  | `Load`   | stops                     |
//! | `U`  | `Unload` | stops                     |
//! | `P`  | `Park`   | parkings                  |
//! | `G`  | `Go`     | exits (target == edge)    |

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use fleet_core::{EdgeId, ResourceId};

use crate::{Action, ActionKind, Mission, MissionError, MissionResult, MissionStore, ResourceEntry};

/// Builds `trk1..trkN` missions.  The same seed always yields the same fleet.
#[derive(Clone, Debug)]
pub struct MissionGenerator {
    templates: Vec<String>,
    stops:     Vec<ResourceEntry>,
    parkings:  Vec<ResourceEntry>,
    exits:     Vec<EdgeId>,
    prefix:    String,
}

impl MissionGenerator {
    pub fn new(templates: Vec<String>) -> Self {
        Self {
            templates,
            stops:    Vec::new(),
            parkings: Vec::new(),
            exits:    Vec::new(),
            prefix:   "trk".to_owned(),
        }
    }

    pub fn stops(mut self, stops: Vec<ResourceEntry>) -> Self {
        self.stops = stops;
        self
    }

    pub fn parkings(mut self, parkings: Vec<ResourceEntry>) -> Self {
        self.parkings = parkings;
        self
    }

    pub fn exits(mut self, exits: Vec<EdgeId>) -> Self {
        self.exits = exits;
        self
    }

    /// Vehicle id prefix (default `"trk"`).
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Generate `count` missions.
    ///
    /// # Errors
    ///
    /// Fails if there are no templates, a template contains an unknown code,
    /// or a code's candidate list is empty.
    pub fn generate(&self, count: usize, seed: u64) -> MissionResult<MissionStore> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut store = MissionStore::new();

        for n in 1..=count {
            let template = self
                .templates
                .choose(&mut rng)
                .ok_or_else(|| MissionError::Generator("no mission templates".into()))?;

            let actions = template
                .chars()
                .map(|code| self.action_for(code, &mut rng))
                .collect::<MissionResult<Vec<_>>>()?;

            store.insert(Mission::new(format!("{}{n}", self.prefix), actions))?;
        }
        Ok(store)
    }

    fn action_for(&self, code: char, rng: &mut SmallRng) -> MissionResult<Action> {
        let kind = ActionKind::from_code(code)
            .ok_or_else(|| MissionError::Generator(format!("unknown template code {code:?}")))?;

        match kind {
            ActionKind::Load | ActionKind::Unload => {
                let stop = pick(&self.stops, rng, kind, "stops")?;
                Ok(Action::new(kind, stop.id.clone(), stop.edge.clone()))
            }
            ActionKind::Park => {
                let parking = pick(&self.parkings, rng, kind, "parkings")?;
                Ok(Action::new(kind, parking.id.clone(), parking.edge.clone()))
            }
            ActionKind::Go => {
                let exit = pick(&self.exits, rng, kind, "exits")?;
                Ok(Action::new(kind, ResourceId::new(exit.as_str()), exit.clone()))
            }
        }
    }
}

fn pick<'a, T>(list: &'a [T], rng: &mut SmallRng, kind: ActionKind, what: &str) -> MissionResult<&'a T> {
    list.choose(rng)
        .ok_or_else(|| MissionError::Generator(format!("no {what} to draw a {kind} target from")))
}
