use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, DevicePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Side effects of one pointer event that at most one manager may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Consumption {
    CursorChange = 1 << 0,
    MouseDragged = 1 << 1,
    ChartEdition = 1 << 2,
    RightClick = 1 << 3,
}

/// Flat bitset of consumed concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsumptionFlags(u8);

impl ConsumptionFlags {
    #[must_use]
    pub fn contains(self, flag: Consumption) -> bool {
        self.0 & flag as u8 != 0
    }

    pub fn insert(&mut self, flag: Consumption) {
        self.0 |= flag as u8;
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Pointer event routed through the overlay managers.
///
/// Position, button and click count are fixed for the whole dispatch; only
/// the consumption flags change as managers claim concerns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    device: DevicePoint,
    data: DataPoint,
    button: PointerButton,
    click_count: u32,
    consumed: ConsumptionFlags,
}

impl PointerEvent {
    #[must_use]
    pub fn new(device: DevicePoint, data: DataPoint) -> Self {
        Self {
            device,
            data,
            button: PointerButton::Primary,
            click_count: 1,
            consumed: ConsumptionFlags::default(),
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }

    #[must_use]
    pub fn device(&self) -> DevicePoint {
        self.device
    }

    #[must_use]
    pub fn data(&self) -> DataPoint {
        self.data
    }

    #[must_use]
    pub fn button(&self) -> PointerButton {
        self.button
    }

    #[must_use]
    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.button == PointerButton::Primary
    }

    #[must_use]
    pub fn is_secondary(&self) -> bool {
        self.button == PointerButton::Secondary
    }

    /// Double-click or more.
    #[must_use]
    pub fn is_multi_click(&self) -> bool {
        self.click_count >= 2
    }

    #[must_use]
    pub fn consumed(&self) -> ConsumptionFlags {
        self.consumed
    }

    #[must_use]
    pub fn is_consumed(&self, flag: Consumption) -> bool {
        self.consumed.contains(flag)
    }

    pub fn consume(&mut self, flag: Consumption) {
        self.consumed.insert(flag);
    }

    /// Test-and-set: `true` when the caller now owns `flag`.
    pub fn try_consume(&mut self, flag: Consumption) -> bool {
        if self.consumed.contains(flag) {
            return false;
        }
        self.consumed.insert(flag);
        true
    }
}
