use std::fmt;

/// How a settle changes the two-slot assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Slot A already holds the settled item; only B (the preload slot) moves.
    ACurrent,
    /// Slot B already holds the settled item; B becomes active and A is repurposed.
    BPromote,
    /// Neither slot holds the settled item; both are reassigned from scratch.
    Reconfig,
}

impl Transition {
    pub const ALL: &[Transition] = &[
        Transition::ACurrent,
        Transition::BPromote,
        Transition::Reconfig,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Transition::ACurrent => "A_CURRENT",
            Transition::BPromote => "B_PROMOTE",
            Transition::Reconfig => "RECONFIG",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Everything the decision needs, captured at momentum end.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput {
    pub offset_y: f64,
    pub last_offset_y: f64,
    /// Viewport height in scroll units. One feed item is exactly one screen tall.
    pub screen_height: f64,
    pub list_len: usize,
    pub a_index: Option<usize>,
    pub b_index: Option<usize>,
}

/// Result of [`decide_transition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub next_index: usize,
    pub direction_down: bool,
    pub preload_index: Option<usize>,
    pub transition: Transition,
    pub next_last_offset_y: f64,
}

impl Decision {
    fn degenerate(offset_y: f64) -> Self {
        Self {
            next_index: 0,
            direction_down: true,
            preload_index: None,
            transition: Transition::Reconfig,
            next_last_offset_y: offset_y,
        }
    }
}

/// Map a resting scroll offset onto the two-slot assignment.
///
/// Pure and total: an empty list or a non-positive viewport yields a
/// reconfigure-to-0 result instead of failing. Equal offsets count as
/// scrolling down, so a gesture that ends where it began keeps preloading
/// the next item.
pub fn decide_transition(input: &DecisionInput) -> Decision {
    let DecisionInput {
        offset_y,
        last_offset_y,
        screen_height,
        list_len,
        a_index,
        b_index,
    } = *input;

    if list_len == 0 || !screen_height.is_finite() || screen_height <= 0.0 {
        return Decision::degenerate(offset_y);
    }

    let last = (list_len - 1) as f64;
    // NaN collapses to 0 through max().
    let next_index = (offset_y / screen_height).round().max(0.0).min(last) as usize;
    let direction_down = offset_y >= last_offset_y;

    let preload_index = if direction_down {
        next_index.checked_add(1).filter(|&i| i < list_len)
    } else {
        next_index.checked_sub(1)
    };

    let transition = if Some(next_index) == a_index {
        Transition::ACurrent
    } else if Some(next_index) == b_index {
        Transition::BPromote
    } else {
        Transition::Reconfig
    };

    Decision {
        next_index,
        direction_down,
        preload_index,
        transition,
        next_last_offset_y: offset_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f64 = 800.0;

    fn input(offset_y: f64, last_offset_y: f64, a: Option<usize>, b: Option<usize>) -> DecisionInput {
        DecisionInput {
            offset_y,
            last_offset_y,
            screen_height: H,
            list_len: 5,
            a_index: a,
            b_index: b,
        }
    }

    #[test]
    fn empty_list_is_degenerate_reconfig() {
        let d = decide_transition(&DecisionInput {
            list_len: 0,
            ..input(1234.0, 0.0, Some(0), Some(1))
        });
        assert_eq!(d.next_index, 0);
        assert!(d.direction_down);
        assert_eq!(d.preload_index, None);
        assert_eq!(d.transition, Transition::Reconfig);
        assert_eq!(d.next_last_offset_y, 1234.0);
    }

    #[test]
    fn zero_screen_height_is_degenerate_reconfig() {
        let d = decide_transition(&DecisionInput {
            screen_height: 0.0,
            ..input(800.0, 0.0, Some(0), Some(1))
        });
        assert_eq!(d.transition, Transition::Reconfig);
        assert_eq!(d.next_index, 0);
    }

    #[test]
    fn nan_screen_height_is_degenerate_reconfig() {
        let d = decide_transition(&DecisionInput {
            screen_height: f64::NAN,
            ..input(800.0, 0.0, Some(0), Some(1))
        });
        assert_eq!(d.transition, Transition::Reconfig);
    }

    #[test]
    fn rounds_to_nearest_item() {
        assert_eq!(decide_transition(&input(1190.0, 0.0, None, None)).next_index, 1);
        assert_eq!(decide_transition(&input(1210.0, 0.0, None, None)).next_index, 2);
    }

    #[test]
    fn clamps_overscroll() {
        let d = decide_transition(&input(-300.0, 0.0, Some(0), None));
        assert_eq!(d.next_index, 0);
        assert!(!d.direction_down);
        assert_eq!(d.preload_index, None);

        let d = decide_transition(&input(99_999.0, 0.0, None, None));
        assert_eq!(d.next_index, 4);
        assert_eq!(d.preload_index, None);
    }

    #[test]
    fn equal_offsets_count_as_down() {
        let d = decide_transition(&input(1600.0, 1600.0, Some(2), Some(3)));
        assert!(d.direction_down);
        assert_eq!(d.preload_index, Some(3));
        assert_eq!(d.transition, Transition::ACurrent);
    }

    #[test]
    fn scrolling_up_preloads_previous() {
        let d = decide_transition(&input(800.0, 1600.0, Some(2), Some(3)));
        assert!(!d.direction_down);
        assert_eq!(d.next_index, 1);
        assert_eq!(d.preload_index, Some(0));
    }

    #[test]
    fn classifies_against_current_assignment() {
        assert_eq!(
            decide_transition(&input(800.0, 0.0, Some(0), Some(1))).transition,
            Transition::BPromote
        );
        assert_eq!(
            decide_transition(&input(1600.0, 800.0, Some(2), Some(1))).transition,
            Transition::ACurrent
        );
    }

    #[test]
    fn multi_step_jump_reconfigures() {
        let d = decide_transition(&input(3200.0, 0.0, Some(0), Some(1)));
        assert_eq!(d.next_index, 4);
        assert_eq!(d.transition, Transition::Reconfig);
        assert_eq!(d.preload_index, None);
    }

    #[test]
    fn single_steps_in_one_direction_never_reconfigure() {
        // Mirror the engine's bookkeeping: the settled slot stays, the other takes the preload.
        let mut a = Some(0);
        let mut b = Some(1);
        let mut last = 0.0;
        for step in 1..5usize {
            let offset = step as f64 * H;
            let d = decide_transition(&input(offset, last, a, b));
            assert_ne!(d.transition, Transition::Reconfig, "step {step}");
            match d.transition {
                Transition::ACurrent => b = d.preload_index,
                Transition::BPromote => a = d.preload_index,
                Transition::Reconfig => unreachable!(),
            }
            last = d.next_last_offset_y;
        }
    }

    #[test]
    fn transition_display_names() {
        assert_eq!(Transition::ACurrent.to_string(), "A_CURRENT");
        assert_eq!(Transition::BPromote.to_string(), "B_PROMOTE");
        assert_eq!(Transition::Reconfig.to_string(), "RECONFIG");
        assert_eq!(Transition::ALL.len(), 3);
    }
}
