use serde::{Deserialize, Serialize};

/// Components a slot can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelKind {
    ControlPanel,
    Instructions,
    SpeedMonitor,
    CurrentMonitor,
    PositionMonitor,
    Mapping,
}

impl PanelKind {
    pub const ALL: [PanelKind; 6] = [
        PanelKind::ControlPanel,
        PanelKind::Instructions,
        PanelKind::SpeedMonitor,
        PanelKind::CurrentMonitor,
        PanelKind::PositionMonitor,
        PanelKind::Mapping,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PanelKind::ControlPanel => "Control Panel",
            PanelKind::Instructions => "Instructions",
            PanelKind::SpeedMonitor => "Speed Monitor",
            PanelKind::CurrentMonitor => "Current Monitor",
            PanelKind::PositionMonitor => "Position Monitor",
            PanelKind::Mapping => "Mapping",
        }
    }

    /// Panels that own a timer or bridge-side scripts can only be open once.
    pub fn single_instance(&self) -> bool {
        !matches!(self, PanelKind::Instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_instance_kinds() {
        assert!(!PanelKind::Instructions.single_instance());
        assert!(PanelKind::Mapping.single_instance());
        assert!(PanelKind::ControlPanel.single_instance());
    }

    #[test]
    fn test_kind_names_in_toml() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            panels: Vec<PanelKind>,
        }
        let text = toml::to_string(&Wrapper { panels: PanelKind::ALL.to_vec() }).unwrap();
        assert!(text.contains("\"PositionMonitor\""));
        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back.panels, PanelKind::ALL.to_vec());
    }
}
