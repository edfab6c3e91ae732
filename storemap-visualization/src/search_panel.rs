//! Search panel: product text, department selector and load status

use storemap_core::{LoadStatus, StoreMap};

/// Dropdown label for the empty selection
pub const ALL_DEPARTMENTS: &str = "All departments";
/// Widget id of the free-text field
pub const SEARCH_FIELD_ID: &str = "product-search";
/// Widget id of the category dropdown
pub const CATEGORY_DROPDOWN_ID: &str = "category-dropdown";

/// The "Store map" window drawn over the scene
#[derive(Debug, Default)]
pub struct SearchPanel;

impl SearchPanel {
    pub fn new() -> Self {
        Self
    }

    /// Draw the panel and run a search when requested.
    ///
    /// A search runs on the Search button or on Enter in the text field.
    /// Returns whether a search ran this frame.
    pub fn show(&mut self, ctx: &egui::Context, map: &mut StoreMap) -> bool {
        let mut search = false;
        let categories: Vec<String> = map.categories().categories().map(str::to_string).collect();

        egui::Window::new("Store map")
            .default_pos([16.0, 16.0])
            .resizable(false)
            .show(ctx, |ui| {
                let inputs = map.inputs_mut();

                ui.horizontal(|ui| {
                    ui.label("Product");
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut inputs.text)
                            .id(egui::Id::new(SEARCH_FIELD_ID))
                            .hint_text("e.g. games"),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        search = true;
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Department");
                    egui::ComboBox::from_id_source(CATEGORY_DROPDOWN_ID)
                        .selected_text(selection_label(&inputs.selection))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut inputs.selection, String::new(), ALL_DEPARTMENTS);
                            for category in &categories {
                                ui.selectable_value(
                                    &mut inputs.selection,
                                    category.clone(),
                                    display_name(category),
                                );
                            }
                        });
                });

                if ui.button("Search").clicked() {
                    search = true;
                }

                ui.separator();
                match map.load_status() {
                    LoadStatus::Failed(_) => {
                        ui.colored_label(egui::Color32::RED, load_status_text(map.load_status()));
                    }
                    status => {
                        ui.label(load_status_text(status));
                    }
                }
                if let Some(resolution) = map.last_resolution() {
                    ui.label(resolution.to_string());
                }
            });

        if search {
            map.search_product();
        }
        search
    }
}

/// Human-readable load status
pub fn load_status_text(status: &LoadStatus) -> String {
    match status {
        LoadStatus::Pending => "Loading store map...".to_string(),
        LoadStatus::Loaded { sections } => format!("{} sections indexed", sections),
        LoadStatus::Failed(message) => format!("Failed to load store map: {}", message),
    }
}

/// Category key as shown in the dropdown
pub fn display_name(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Text shown on the closed dropdown for the current selection
pub fn selection_label(selection: &str) -> String {
    if selection.is_empty() {
        ALL_DEPARTMENTS.to_string()
    } else {
        display_name(selection)
    }
}
