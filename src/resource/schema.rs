use serde::Serialize;

pub const REGION: &str = "region";
pub const CHANNEL: &str = "channel";
pub const TYPE: &str = "type";
pub const AMI: &str = "ami";

/// Declaration of one attribute of the `coreos_ami` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
}

impl FieldSchema {
    const fn input(name: &'static str, description: &'static str, default: &'static str) -> Self {
        Self {
            name,
            description,
            default: Some(default),
            optional: true,
            computed: false,
            force_new: true,
        }
    }
}

static FIELDS: [FieldSchema; 4] = [
    FieldSchema::input(REGION, "AWS region", "us-west-2"),
    FieldSchema::input(CHANNEL, "CoreOS update channel", "stable"),
    FieldSchema::input(TYPE, "virtualization type", "pv"),
    FieldSchema {
        name: AMI,
        description: "ami",
        default: None,
        optional: false,
        computed: true,
        force_new: false,
    },
];

/// All attributes, inputs first.
pub fn schema() -> &'static [FieldSchema] {
    &FIELDS
}

pub fn field(name: &str) -> Option<&'static FieldSchema> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Default value for an input attribute.
pub fn default_for(name: &str) -> Option<&'static str> {
    field(name).and_then(|f| f.default)
}
