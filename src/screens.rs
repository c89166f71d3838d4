use crate::a11y::AccessibilitySettings;
use crate::focus::graph::FocusableSection;
use crate::focus::tree::{ElementTree, SectionId, TreeBuilder};
use crate::order::OrderState;
use crate::route::{ModalKind, RouteController, Screen};

/// What activating an element asks the application to do. Declared by the
/// screen content; the accessibility core only relays it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Navigate(Screen),
    OpenItemOptions(&'static str),
    AddItem(&'static str),
    RemoveItem(&'static str),
    /// Open the order-confirmation modal.
    ConfirmOrder,
    /// From the confirmation modal: proceed to the payment screen.
    PlaceOrder,
    CommitPayment,
    ConfirmItem,
    CloseModal,
    ToggleContrast,
    CycleVolume,
    ToggleLargeText,
    ToggleLowScreen,
    StartOver,
    ExtendSession,
}

pub const SEC_ACCESSIBILITY: SectionId = SectionId("accessibility");
pub const SEC_MENU: SectionId = SectionId("menu-items");
pub const SEC_ORDER: SectionId = SectionId("order-lines");
pub const SEC_QUANTITY: SectionId = SectionId("item-quantity");
pub const SEC_ACTIONS: SectionId = SectionId("actions");

/// Spoken when the Help key is pressed. Fixed usage script.
pub const HELP_SCRIPT: &str = "Use the arrow keys to move between items. \
Up and down jump between sections. Press the round key to select. \
Press repeat to hear the last announcement again. \
Press home at any time to start over.";

/// All sections any screen may use. Registering a section whose container is
/// not mounted is harmless; traversal treats it as absent.
pub fn all_sections() -> Vec<FocusableSection> {
    vec![
        FocusableSection {
            id: SEC_ACCESSIBILITY,
            label: "Accessibility options".to_string(),
        },
        FocusableSection {
            id: SEC_MENU,
            label: "Menu items".to_string(),
        },
        FocusableSection {
            id: SEC_ORDER,
            label: "Order items".to_string(),
        },
        FocusableSection {
            id: SEC_QUANTITY,
            label: "Quantity".to_string(),
        },
        FocusableSection {
            id: SEC_ACTIONS,
            label: "Actions".to_string(),
        },
    ]
}

/// Build the whole annotated element tree for the current route: the active
/// screen's containers, then the open modal's content if any.
pub fn build_tree(
    route: &RouteController,
    order: &OrderState,
    settings: &AccessibilitySettings,
    modal_item: Option<&'static str>,
    payment_committed: bool,
) -> ElementTree {
    let mut b = TreeBuilder::new();
    match route.screen() {
        Screen::Start => build_start(&mut b, settings),
        Screen::Menu => build_menu(&mut b, order),
        Screen::OrderSummary => build_order_summary(&mut b, order),
        Screen::Payment => build_payment(&mut b, payment_committed),
        Screen::Complete => build_complete(&mut b),
    }
    if let Some(modal) = route.modal() {
        b.begin_modal();
        match modal.kind {
            ModalKind::ItemOptions => build_item_options(&mut b, order, modal_item),
            ModalKind::OrderConfirm => build_order_confirm(&mut b, order),
            ModalKind::IdleWarning => build_idle_warning(&mut b),
            ModalKind::PaymentProcessing => build_payment_processing(&mut b),
        }
    }
    b.build()
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn build_start(b: &mut TreeBuilder, settings: &AccessibilitySettings) {
    b.section(SEC_ACCESSIBILITY);
    b.item_spoken(
        "High contrast",
        format!("High contrast, {}", on_off(settings.high_contrast)),
        Action::ToggleContrast,
    );
    b.item_spoken(
        "Volume",
        format!("Volume, {}", settings.volume.label()),
        Action::CycleVolume,
    );
    b.item_spoken(
        "Large text",
        format!("Large text, {}", on_off(settings.large_text)),
        Action::ToggleLargeText,
    );
    b.item_spoken(
        "Lower screen",
        format!("Lower screen, {}", on_off(settings.low_screen)),
        Action::ToggleLowScreen,
    );
    b.section(SEC_ACTIONS);
    b.item("Start order", Action::Navigate(Screen::Menu));
}

fn build_menu(b: &mut TreeBuilder, order: &OrderState) {
    b.section(SEC_MENU);
    for line in &order.lines {
        if line.qty > 0 {
            b.item_spoken(
                line.name,
                format!("{}, {} in order", line.name, line.qty),
                Action::OpenItemOptions(line.id),
            );
        } else {
            b.item(line.name, Action::OpenItemOptions(line.id));
        }
    }
    b.section(SEC_ACTIONS);
    if order.is_empty() {
        b.item_disabled("Review order", Action::Navigate(Screen::OrderSummary));
    } else {
        b.item("Review order", Action::Navigate(Screen::OrderSummary));
    }
    b.item("Start over", Action::StartOver);
}

fn build_order_summary(b: &mut TreeBuilder, order: &OrderState) {
    b.section(SEC_ORDER);
    let mut any = false;
    for line in order.lines.iter().filter(|l| l.qty > 0) {
        any = true;
        b.item_spoken(
            format!("{} x{}", line.name, line.qty),
            format!("{}, quantity {}", line.name, line.qty),
            Action::OpenItemOptions(line.id),
        );
    }
    if !any {
        b.static_text("Your order is empty");
    }
    b.section(SEC_ACTIONS);
    if any {
        b.item("Proceed to payment", Action::ConfirmOrder);
    } else {
        b.item_disabled("Proceed to payment", Action::ConfirmOrder);
    }
    b.item("Back to menu", Action::Navigate(Screen::Menu));
}

fn build_payment(b: &mut TreeBuilder, payment_committed: bool) {
    b.end_section();
    b.static_text("Pay with the card terminal below the screen");
    b.section(SEC_ACTIONS);
    if payment_committed {
        b.item_disabled("Pay now", Action::CommitPayment);
        b.item_disabled("Cancel payment", Action::Navigate(Screen::OrderSummary));
    } else {
        b.item("Pay now", Action::CommitPayment);
        b.item("Cancel payment", Action::Navigate(Screen::OrderSummary));
    }
}

fn build_complete(b: &mut TreeBuilder) {
    b.end_section();
    b.static_text("Thank you. Please take your receipt.");
    b.section(SEC_ACTIONS);
    b.item("Start new order", Action::StartOver);
}

fn build_item_options(b: &mut TreeBuilder, order: &OrderState, modal_item: Option<&'static str>) {
    let Some(line) = modal_item.and_then(|id| order.line(id)) else {
        // Target vanished between open and rebuild; leave the modal empty
        // rather than failing. The dismiss path still works via Back.
        b.static_text("This item is unavailable");
        return;
    };
    b.static_text(line.name);
    b.section(SEC_QUANTITY);
    b.item_spoken(
        "Add one",
        format!("Add one {}", line.name),
        Action::AddItem(line.id),
    );
    if line.qty > 0 {
        b.item_spoken(
            "Remove one",
            format!("Remove one {}", line.name),
            Action::RemoveItem(line.id),
        );
    } else {
        b.item_disabled("Remove one", Action::RemoveItem(line.id));
    }
    b.section(SEC_ACTIONS);
    b.item("Done", Action::ConfirmItem);
    b.item("Cancel", Action::CloseModal);
}

fn build_order_confirm(b: &mut TreeBuilder, order: &OrderState) {
    b.static_text(format!("{} items in your order", order.total_items()));
    b.section(SEC_ACTIONS);
    b.item("Place order", Action::PlaceOrder);
    b.item("Keep ordering", Action::CloseModal);
}

fn build_idle_warning(b: &mut TreeBuilder) {
    b.static_text("The session will reset soon");
    b.section(SEC_ACTIONS);
    b.item("I need more time", Action::ExtendSession);
    b.item("Start over now", Action::StartOver);
}

fn build_payment_processing(b: &mut TreeBuilder) {
    b.static_text("Waiting for the payment terminal");
}
