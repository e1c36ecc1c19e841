//! Claiming pre-printed track.
//!
//! Some maps print unowned track on the board. It cannot carry goods until a
//! player pays its claim cost, and a player may only claim a segment that
//! links into a city or into their own network.

use crate::coordinates::{Coordinates, Exit};
use crate::grid::{Grid, RouteEnd};
use crate::player::PlayerColor;
use crate::track::Track;
use thiserror::Error;
use tracing::debug;

/// Why a claim is not allowed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidClaimReason {
    #[error("no track with those exits at {0}")]
    NoTrack(Coordinates),

    #[error("track is not claimable")]
    NotClaimable,

    #[error("track is already owned")]
    AlreadyOwned,

    #[error("claimed track must connect to a city or your own track")]
    Unconnected,
}

pub struct ClaimValidator<'a> {
    grid: &'a Grid,
}

impl<'a> ClaimValidator<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// The segment at `coordinates` with exactly these exits, in either order
    pub fn find_track(&self, coordinates: Coordinates, exits: [Exit; 2]) -> Option<&'a Track> {
        self.grid.get_land(coordinates)?.tracks().iter().find(|track| {
            let [a, b] = track.exits();
            (a == exits[0] && b == exits[1]) || (a == exits[1] && b == exits[0])
        })
    }

    pub fn get_invalid_claim_reason(
        &self,
        player: PlayerColor,
        coordinates: Coordinates,
        exits: [Exit; 2],
    ) -> Option<InvalidClaimReason> {
        let reason = self.validate(player, coordinates, exits).err();
        if let Some(reason) = &reason {
            debug!(%coordinates, %player, %reason, "rejected claim");
        }
        reason
    }

    fn validate(
        &self,
        player: PlayerColor,
        coordinates: Coordinates,
        exits: [Exit; 2],
    ) -> Result<(), InvalidClaimReason> {
        let track = self
            .find_track(coordinates, exits)
            .ok_or(InvalidClaimReason::NoTrack(coordinates))?;
        if track.owner().is_some() {
            return Err(InvalidClaimReason::AlreadyOwned);
        }
        if !track.is_claimable() {
            return Err(InvalidClaimReason::NotClaimable);
        }

        let reaches_city = self
            .grid
            .route_ends(track)
            .iter()
            .any(|end| matches!(end, RouteEnd::City(_)));
        let joins_own = track
            .get_route(self.grid)
            .iter()
            .any(|segment| segment.owner() == Some(player));
        if reaches_city || joins_own {
            Ok(())
        } else {
            Err(InvalidClaimReason::Unconnected)
        }
    }
}
