//! Assistant reply model and the classifier that decodes raw payloads into it.
//!
//! The backend is trusted for shape but not for completeness: every field is
//! read with a presence check and falls back to an empty value, so a reply
//! that is missing pieces still produces something renderable.

use serde_json::{Map, Value};

/// Discriminant value that selects the meal-plan variant.
pub const MEAL_PLAN_TYPE: &str = "meal_plan";

/// A reply from the assistant endpoint, after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    /// Plain text reply. `message` is `None` when the backend sent `null` or
    /// omitted the field.
    Text { message: Option<String> },
    MealPlan(MealPlan),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MealPlan {
    pub message: String,
    pub meal_plan: Vec<Recipe>,
    pub shopping_list: Vec<ShoppingItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recipe {
    pub id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ingredient {
    pub name: String,
    pub measure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShoppingItem {
    pub name: String,
    pub needed: f64,
}

impl ShoppingItem {
    /// Quantity as shown to the user: whole numbers drop the fractional part.
    pub fn needed_display(&self) -> String {
        if self.needed.is_finite() && self.needed.fract() == 0.0 && self.needed.abs() < 1e15 {
            format!("{}", self.needed as i64)
        } else {
            format!("{}", self.needed)
        }
    }
}

/// Decide which reply variant a payload represents.
///
/// Anything that is not an object with `type == "meal_plan"` is a text
/// reply, including non-object payloads.
pub fn classify(payload: &Value) -> AgentResponse {
    let Some(obj) = payload.as_object() else {
        tracing::debug!("payload is not an object, treating as empty text reply");
        return AgentResponse::Text { message: None };
    };

    match obj.get("type").and_then(Value::as_str) {
        Some(MEAL_PLAN_TYPE) => AgentResponse::MealPlan(decode_meal_plan(obj)),
        other => {
            if let Some(kind) = other.filter(|k| *k != "text") {
                tracing::debug!(kind, "unrecognized reply type, treating as text");
            }
            AgentResponse::Text {
                message: message_text(obj.get("message")),
            }
        }
    }
}

fn decode_meal_plan(obj: &Map<String, Value>) -> MealPlan {
    let recipes = array_field(obj, &["meal_plan", "mealPlan"])
        .iter()
        .filter_map(decode_recipe)
        .collect();

    let shopping_list = array_field(obj, &["shopping_list", "shoppingList"])
        .iter()
        .filter_map(decode_shopping_item)
        .collect();

    MealPlan {
        message: message_text(obj.get("message")).unwrap_or_default(),
        meal_plan: recipes,
        shopping_list,
    }
}

fn decode_recipe(value: &Value) -> Option<Recipe> {
    let obj = value.as_object()?;
    let ingredients = array_field(obj, &["ingredients"])
        .iter()
        .filter_map(decode_ingredient)
        .collect();

    Some(Recipe {
        id: obj.get("id").and_then(scalar_text),
        name: string_field(obj, "name").unwrap_or_default(),
        // An empty image URL is as good as none
        image: string_field(obj, "image").filter(|s| !s.trim().is_empty()),
        ingredients,
    })
}

fn decode_ingredient(value: &Value) -> Option<Ingredient> {
    let obj = value.as_object()?;
    Some(Ingredient {
        name: string_field(obj, "name").unwrap_or_default(),
        measure: obj.get("measure").and_then(scalar_text),
    })
}

fn decode_shopping_item(value: &Value) -> Option<ShoppingItem> {
    let obj = value.as_object()?;
    let needed = match obj.get("needed") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Some(ShoppingItem {
        name: string_field(obj, "name").unwrap_or_default(),
        needed,
    })
}

/// First present array among `keys`; anything else reads as empty.
fn array_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `message` verbatim when it is a string, its JSON text for any other
/// non-null value.
fn message_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
