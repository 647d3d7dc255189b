//! Sample dialogs driven by the `topic-dialog` binary
//!
//! The root collects a name and an age, greets, and handles a small alarm
//! list kept in the conversation's ambient data under `alarms`.

mod alarms;
mod root;

pub use alarms::{AddAlarm, AddAlarmState, DeleteAlarm, DeleteAlarmState};
pub use root::{RootDialog, RootState};

use crate::parent::ParentTopic;
use crate::runtime::RootFactory;
use crate::topic::{TopicError, TurnContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ambient key holding the alarm list
pub const ALARMS_KEY: &str = "alarms";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub title: String,
    /// `HH:MM`, 24-hour
    pub time: String,
}

pub fn load_alarms(ambient: &Map<String, Value>) -> Result<Vec<Alarm>, TopicError> {
    match ambient.get(ALARMS_KEY) {
        Some(alarms) => Ok(Vec::<Alarm>::deserialize(alarms)?),
        None => Ok(Vec::new()),
    }
}

pub fn store_alarms(ambient: &mut Map<String, Value>, alarms: &[Alarm]) -> Result<(), TopicError> {
    ambient.insert(ALARMS_KEY.to_string(), serde_json::to_value(alarms)?);
    Ok(())
}

/// Send the alarm list, one line per alarm
pub fn show_alarms(ctx: &mut dyn TurnContext, alarms: &[Alarm]) {
    match alarms.len() {
        0 => {
            ctx.reply("You have no alarms.");
        }
        1 => {
            ctx.reply("You have one alarm:");
        }
        n => {
            ctx.reply(format!("You have {n} alarms:"));
        }
    }
    for alarm in alarms {
        ctx.reply(format!("- {} at {}", alarm.title, alarm.time));
    }
}

/// Builds a fresh [`RootDialog`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoRootFactory;

impl RootFactory for DemoRootFactory {
    type Root = ParentTopic<RootDialog>;

    fn build(&self) -> Result<Self::Root, TopicError> {
        ParentTopic::new(RootDialog, RootState::default())
    }
}
