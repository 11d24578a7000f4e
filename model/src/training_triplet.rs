use anyhow::{anyhow, Result};
use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeTuple, Serializer};
use std::fmt;

/// One recorded position of a self-play game.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingTriplet {
    /// The encoded state.
    pub state: Vec<f32>,
    /// Normalized visit counts over the full action space. Zero on illegal actions.
    pub policy: Vec<f32>,
    /// The final result of the game from the perspective of the player to move in `state`.
    pub outcome: f32,
}

impl TrainingTriplet {
    pub fn new(state: Vec<f32>, policy: Vec<f32>, outcome: f32) -> Self {
        Self {
            state,
            policy,
            outcome,
        }
    }

    /// Checks that every value is finite, that the policy is a distribution and that the
    /// outcome is a loss, draw or win.
    pub fn validate(&self) -> Result<()> {
        if !self.state.iter().all(|v| v.is_finite()) {
            return Err(anyhow!("State contains non-finite values"));
        }

        if !self.policy.iter().all(|p| p.is_finite() && *p >= 0.0) {
            return Err(anyhow!("Policy contains negative or non-finite values"));
        }

        let mass = self.policy.iter().sum::<f32>();
        if (mass - 1.0).abs() > POLICY_MASS_TOLERANCE {
            return Err(anyhow!("Policy must sum to 1 but summed to {}", mass));
        }

        if ![-1.0, 0.0, 1.0].contains(&self.outcome) {
            return Err(anyhow!(
                "Outcome must be -1, 0 or 1 but was {}",
                self.outcome
            ));
        }

        Ok(())
    }
}

const POLICY_MASS_TOLERANCE: f32 = 1e-3;

impl Serialize for TrainingTriplet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.state)?;
        tup.serialize_element(&self.policy)?;
        tup.serialize_element(&self.outcome)?;

        tup.end()
    }
}

struct TrainingTripletVisitor;

impl<'de> Visitor<'de> for TrainingTripletVisitor {
    type Value = TrainingTriplet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a [state, policy, outcome] triplet")
    }

    fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
    where
        S: SeqAccess<'de>,
    {
        let state = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let policy = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let outcome = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(2, &self))?;

        Ok(TrainingTriplet {
            state,
            policy,
            outcome,
        })
    }
}

impl<'de> Deserialize<'de> for TrainingTriplet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_tuple(3, TrainingTripletVisitor)
    }
}
