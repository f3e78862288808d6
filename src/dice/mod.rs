pub mod history;
pub mod labels;
pub mod mesh;
pub mod physics;
pub mod sequencer;
pub mod systems;
pub mod types;

pub use history::*;
pub use labels::*;
pub use mesh::*;
pub use physics::*;
pub use sequencer::*;
pub use systems::*;
pub use types::*;

use bevy::prelude::*;

/// Wires the die, its roll sequencer, and the history panel into an app.
///
/// Expects `DieConfig`, `RollRng`, and `RollHistory` resources to be
/// inserted beforehand, and the Rapier physics plugin to be present.
pub struct DicePlugin;

impl Plugin for DicePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RollSequencer>()
            .add_message::<RollRequested>()
            .add_message::<RollCompleted>()
            .add_message::<HistoryCleared>()
            .add_systems(Startup, systems::setup)
            .add_systems(
                Update,
                (
                    systems::handle_roll_key,
                    systems::handle_roll_button,
                    sequencer::start_requested_rolls,
                    sequencer::advance_sequencer,
                    sequencer::animate_presentation,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    systems::record_results,
                    systems::handle_clear_button,
                    systems::update_history_panel,
                )
                    .chain()
                    .after(sequencer::advance_sequencer),
            );
    }
}
