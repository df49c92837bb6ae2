/// The two cardinal layout axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn flip(&self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// A direction along either layout axis.
///
/// For a scrollable, this is the direction in which the scroll offset
/// increases: [`AxisDirection::Down`] is a conventional vertical list,
/// [`AxisDirection::Up`] a bottom-anchored one, and so on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    Up,
    Right,
    Down,
    Left,
}

impl Default for AxisDirection {
    fn default() -> Self {
        AxisDirection::Down
    }
}

impl AxisDirection {
    pub fn flip(&self) -> AxisDirection {
        match self {
            AxisDirection::Down => AxisDirection::Up,
            AxisDirection::Left => AxisDirection::Right,
            AxisDirection::Right => AxisDirection::Left,
            AxisDirection::Up => AxisDirection::Down,
        }
    }
}

pub fn axis_direction_to_axis(axis_direction: AxisDirection) -> Axis {
    match axis_direction {
        AxisDirection::Up | AxisDirection::Down => Axis::Vertical,
        AxisDirection::Left | AxisDirection::Right => Axis::Horizontal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_is_involutive() {
        for dir in [
            AxisDirection::Up,
            AxisDirection::Right,
            AxisDirection::Down,
            AxisDirection::Left,
        ] {
            assert_eq!(dir.flip().flip(), dir);
            assert_eq!(
                axis_direction_to_axis(dir),
                axis_direction_to_axis(dir.flip())
            );
        }
    }
}
