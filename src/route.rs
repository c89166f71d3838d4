use std::time::Instant;

use crate::focus::tree::ElementId;

/// Every screen the kiosk can show. Fixed set; screens own their element
/// trees and replace them wholesale on transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Start,
    Menu,
    OrderSummary,
    Payment,
    Complete,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Start => "Welcome",
            Screen::Menu => "Menu",
            Screen::OrderSummary => "Your order",
            Screen::Payment => "Payment",
            Screen::Complete => "Order complete",
        }
    }

    /// Destination for the Back key, if any.
    pub fn back_target(self) -> Option<Screen> {
        match self {
            Screen::Start => None,
            Screen::Menu => Some(Screen::Start),
            Screen::OrderSummary => Some(Screen::Menu),
            Screen::Payment => Some(Screen::OrderSummary),
            Screen::Complete => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalKind {
    ItemOptions,
    OrderConfirm,
    IdleWarning,
    PaymentProcessing,
}

impl ModalKind {
    pub fn title(self) -> &'static str {
        match self {
            ModalKind::ItemOptions => "Item options",
            ModalKind::OrderConfirm => "Confirm order",
            ModalKind::IdleWarning => "Are you still there?",
            ModalKind::PaymentProcessing => "Processing payment",
        }
    }

    /// Home and Back are unavailable while payment is in flight.
    pub fn blocks_home(self) -> bool {
        matches!(self, ModalKind::PaymentProcessing)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ModalEntry {
    pub kind: ModalKind,
    pub opened_at: Instant,
    /// Element to hand focus back to when this modal closes.
    pub restore_focus: Option<ElementId>,
}

/// Current screen plus at most one open modal.
///
/// Modal precedence is last-open-wins: opening a modal while another is open
/// closes the prior one first, so two modals are never interactive at once.
#[derive(Debug)]
pub struct RouteController {
    screen: Screen,
    modal: Option<ModalEntry>,
}

impl RouteController {
    pub fn new() -> Self {
        Self {
            screen: Screen::Start,
            modal: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn modal(&self) -> Option<&ModalEntry> {
        self.modal.as_ref()
    }

    pub fn modal_open(&self) -> bool {
        self.modal.is_some()
    }

    /// Change screens. Any open modal belongs to the outgoing screen and is
    /// closed as part of the transition. Returns the previous screen.
    pub fn navigate(&mut self, screen: Screen) -> Screen {
        self.modal = None;
        std::mem::replace(&mut self.screen, screen)
    }

    /// Open a modal; returns the entry it displaced, if any.
    pub fn open_modal(
        &mut self,
        kind: ModalKind,
        now: Instant,
        restore_focus: Option<ElementId>,
    ) -> Option<ModalEntry> {
        self.modal.replace(ModalEntry {
            kind,
            opened_at: now,
            restore_focus,
        })
    }

    pub fn close_modal(&mut self) -> Option<ModalEntry> {
        self.modal.take()
    }
}

impl Default for RouteController {
    fn default() -> Self {
        Self::new()
    }
}
