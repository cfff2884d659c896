//! Build rules and piece suggestion
//!
//! [`BuildRules`] decides which pieces may be attached to a selected piece,
//! [`SuggestionStrategy`] picks the one preselected for the user.

use tracing::trace;

use trackforge_core::{BuildDirection, PieceType, StructureType};

/// Source of the pieces that may follow a selected piece
pub trait BuildRules: Send + Sync {
    /// Buildable pieces for a structure kind next to `piece` in `direction`
    fn buildable_pieces(
        &self,
        structure_type: StructureType,
        piece: PieceType,
        direction: BuildDirection,
    ) -> Vec<PieceType>;
}

/// Pieces must continue the slope of the selected piece
///
/// Building forward, a piece must begin with the slope the selected piece
/// ends with; building backward, it must end with the slope the selected
/// piece begins with.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlopeContinuityRules;

impl BuildRules for SlopeContinuityRules {
    fn buildable_pieces(
        &self,
        structure_type: StructureType,
        piece: PieceType,
        direction: BuildDirection,
    ) -> Vec<PieceType> {
        let current = piece.definition();
        let pieces: Vec<PieceType> = PieceType::ALL
            .into_iter()
            .filter(|candidate| structure_type.supports(*candidate))
            .filter(|candidate| {
                let def = candidate.definition();
                match direction {
                    BuildDirection::Next => def.begin_slope == current.end_slope,
                    BuildDirection::Previous => def.end_slope == current.begin_slope,
                }
            })
            .collect();
        trace!(
            "{} buildable {} of {} on {}",
            pieces.len(),
            direction,
            piece,
            structure_type
        );
        pieces
    }
}

/// Picks the preselected piece from a buildable set
pub trait SuggestionStrategy: Send + Sync {
    /// `current` is the selected piece, `previous` the piece selected for
    /// building before the buildable set changed
    fn suggest(
        &self,
        current: Option<PieceType>,
        previous: Option<PieceType>,
        buildable: &[PieceType],
        direction: BuildDirection,
    ) -> Option<PieceType>;
}

/// Keep building what is already being built
///
/// Preference order: the selected piece, the previous choice, a straight
/// that keeps the slope at the joint, flat, then the first buildable piece.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContinuationSuggestion;

impl SuggestionStrategy for ContinuationSuggestion {
    fn suggest(
        &self,
        current: Option<PieceType>,
        previous: Option<PieceType>,
        buildable: &[PieceType],
        direction: BuildDirection,
    ) -> Option<PieceType> {
        let allowed = |piece: &PieceType| buildable.contains(piece);

        if let Some(piece) = current.filter(allowed) {
            return Some(piece);
        }
        if let Some(piece) = previous.filter(allowed) {
            return Some(piece);
        }

        let joint_slope = current.map(|piece| {
            let def = piece.definition();
            match direction {
                BuildDirection::Next => def.end_slope,
                BuildDirection::Previous => def.begin_slope,
            }
        });
        if let Some(slope) = joint_slope {
            let straight = buildable.iter().copied().find(|piece| {
                let def = piece.definition();
                !piece.is_curved()
                    && !def.is_station
                    && def.begin_slope == slope
                    && def.end_slope == slope
            });
            if straight.is_some() {
                return straight;
            }
        }

        if allowed(&PieceType::Flat) {
            return Some(PieceType::Flat);
        }
        buildable.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_continues_with_flat_starts() {
        let pieces = SlopeContinuityRules.buildable_pieces(
            StructureType::SteelRollerCoaster,
            PieceType::Flat,
            BuildDirection::Next,
        );
        assert!(pieces.contains(&PieceType::Flat));
        assert!(pieces.contains(&PieceType::FlatToUp25));
        assert!(pieces.contains(&PieceType::LeftQuarterTurn3Tiles));
        assert!(!pieces.contains(&PieceType::Up25));
    }

    #[test]
    fn test_previous_direction_matches_begin_slope() {
        let pieces = SlopeContinuityRules.buildable_pieces(
            StructureType::SteelRollerCoaster,
            PieceType::Up25,
            BuildDirection::Previous,
        );
        assert!(pieces.contains(&PieceType::Up25));
        assert!(pieces.contains(&PieceType::FlatToUp25));
        assert!(pieces.contains(&PieceType::Up60ToUp25));
        assert!(!pieces.contains(&PieceType::Flat));
    }

    #[test]
    fn test_unsupported_pieces_are_filtered() {
        let pieces = SlopeContinuityRules.buildable_pieces(
            StructureType::MiniatureRailway,
            PieceType::Up25,
            BuildDirection::Next,
        );
        assert!(pieces.contains(&PieceType::Up25));
        assert!(!pieces.contains(&PieceType::Up25ToUp60));

        assert!(SlopeContinuityRules
            .buildable_pieces(StructureType::FoodStall, PieceType::Flat, BuildDirection::Next)
            .is_empty());
    }

    #[test]
    fn test_suggestion_prefers_current_piece() {
        let buildable = [PieceType::Flat, PieceType::FlatToUp25];
        assert_eq!(
            ContinuationSuggestion.suggest(
                Some(PieceType::Flat),
                Some(PieceType::FlatToUp25),
                &buildable,
                BuildDirection::Next
            ),
            Some(PieceType::Flat)
        );
    }

    #[test]
    fn test_suggestion_keeps_previous_choice() {
        let buildable = [PieceType::Flat, PieceType::FlatToUp25];
        assert_eq!(
            ContinuationSuggestion.suggest(
                Some(PieceType::Up25ToFlat),
                Some(PieceType::FlatToUp25),
                &buildable,
                BuildDirection::Next
            ),
            Some(PieceType::FlatToUp25)
        );
    }

    #[test]
    fn test_suggestion_continues_slope() {
        let buildable = SlopeContinuityRules.buildable_pieces(
            StructureType::SteelRollerCoaster,
            PieceType::FlatToUp25,
            BuildDirection::Next,
        );
        assert_eq!(
            ContinuationSuggestion.suggest(
                Some(PieceType::FlatToUp25),
                Some(PieceType::FlatToUp25),
                &buildable,
                BuildDirection::Next
            ),
            Some(PieceType::Up25)
        );
    }

    #[test]
    fn test_suggestion_falls_back() {
        assert_eq!(
            ContinuationSuggestion.suggest(None, None, &[PieceType::Flat], BuildDirection::Next),
            Some(PieceType::Flat)
        );
        assert_eq!(
            ContinuationSuggestion.suggest(
                None,
                None,
                &[PieceType::Down25, PieceType::Down25ToFlat],
                BuildDirection::Next
            ),
            Some(PieceType::Down25)
        );
        assert_eq!(
            ContinuationSuggestion.suggest(Some(PieceType::Flat), None, &[], BuildDirection::Next),
            None
        );
    }
}
