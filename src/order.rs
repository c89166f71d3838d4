/// Order/selection state owned by the catalog collaborator.
///
/// The accessibility core never reads prices or totals; it only needs
/// quantities for spoken labels and `clear_quantities` for the reset sequence.
#[derive(Clone, Debug)]
pub struct OrderLine {
    pub id: &'static str,
    pub name: &'static str,
    pub qty: u32,
}

#[derive(Clone, Debug)]
pub struct OrderState {
    pub lines: Vec<OrderLine>,
}

impl OrderState {
    pub fn demo_catalog() -> Self {
        let names: &[(&'static str, &'static str)] = &[
            ("americano", "Americano"),
            ("latte", "Cafe Latte"),
            ("green-tea", "Green Tea"),
            ("cheesecake", "Cheesecake"),
            ("bagel", "Bagel"),
        ];
        Self {
            lines: names
                .iter()
                .map(|&(id, name)| OrderLine { id, name, qty: 0 })
                .collect(),
        }
    }

    pub fn line(&self, id: &str) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    fn line_mut(&mut self, id: &str) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|l| l.id == id)
    }

    /// Returns the new quantity, or None if the line does not exist.
    pub fn add_one(&mut self, id: &str) -> Option<u32> {
        let line = self.line_mut(id)?;
        line.qty = line.qty.saturating_add(1);
        Some(line.qty)
    }

    pub fn remove_one(&mut self, id: &str) -> Option<u32> {
        let line = self.line_mut(id)?;
        line.qty = line.qty.saturating_sub(1);
        Some(line.qty)
    }

    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.qty).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }

    /// Reset-sequence target: zero every quantity, keep the catalog.
    pub fn clear_quantities(&mut self) {
        for line in &mut self.lines {
            line.qty = 0;
        }
    }
}

impl Default for OrderState {
    fn default() -> Self {
        Self::demo_catalog()
    }
}
