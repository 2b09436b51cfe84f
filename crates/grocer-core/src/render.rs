//! Pure transformation from replies into presentation nodes.
//!
//! Every string taken from a reply ends up in a literal text node. The only
//! renderer-authored markup is the fixed call-to-action under a shopping
//! list.

use crate::response::{AgentResponse, Ingredient, MealPlan, Recipe, ShoppingItem};

pub const INGREDIENTS_HEADING: &str = "Ingredients:";
pub const SHOPPING_LIST_HEADING: &str = "🛒 Shopping List";
pub const CART_CALL_TO_ACTION: &str =
    "Say \"add to cart\" to add these items to your Kroger cart!";

/// Sender tag attached to every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// Semantic role of a grouping node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    MealPlan,
    RecipeCard,
    IngredientList,
    ShoppingList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub src: String,
    pub alt: String,
    /// Set once the host reports a load failure.
    pub hidden: bool,
}

/// A presentation node. Text-bearing variants hold literal text only.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group { role: GroupRole, children: Vec<Node> },
    Heading { level: u8, text: String },
    Paragraph(String),
    /// Emphasised renderer-authored text.
    Strong(String),
    Image(Image),
    List(Vec<String>),
}

impl Node {
    fn group(role: GroupRole, children: Vec<Node>) -> Self {
        Node::Group { role, children }
    }

    /// All descendants in document order, including `self`.
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Node>) {
        out.push(self);
        if let Node::Group { children, .. } = self {
            for child in children {
                child.collect(out);
            }
        }
    }

    /// Visible text, one block per line. Hidden images contribute nothing.
    pub fn text_content(&self) -> String {
        let mut lines = Vec::new();
        for node in self.descendants() {
            match node {
                Node::Group { .. } => {}
                Node::Heading { text, .. } | Node::Paragraph(text) | Node::Strong(text) => {
                    lines.push(text.clone())
                }
                Node::Image(image) => {
                    if !image.hidden {
                        lines.push(image.alt.clone());
                    }
                }
                Node::List(items) => lines.extend(items.iter().cloned()),
            }
        }
        lines.join("\n")
    }

    pub fn image_sources(&self) -> Vec<String> {
        self.descendants()
            .into_iter()
            .filter_map(|node| match node {
                Node::Image(image) => Some(image.src.clone()),
                _ => None,
            })
            .collect()
    }

    /// Hide every image loaded from `src`. Returns how many were hidden.
    pub fn mark_image_failed(&mut self, src: &str) -> usize {
        match self {
            Node::Image(image) if image.src == src && !image.hidden => {
                image.hidden = true;
                1
            }
            Node::Group { children, .. } => children
                .iter_mut()
                .map(|child| child.mark_image_failed(src))
                .sum(),
            _ => 0,
        }
    }
}

/// Body of a chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    /// A single text bubble. `None` renders as an empty bubble.
    Text(Option<String>),
    Node(Node),
    /// Transient placeholder shown while a request is outstanding.
    Typing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn typing_indicator() -> Self {
        Self {
            sender: Sender::Bot,
            content: MessageContent::Typing,
        }
    }

    pub fn is_typing_indicator(&self) -> bool {
        matches!(self.content, MessageContent::Typing)
    }

    pub fn text_content(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone().unwrap_or_default(),
            MessageContent::Node(node) => node.text_content(),
            MessageContent::Typing => String::new(),
        }
    }

    pub fn image_sources(&self) -> Vec<String> {
        match &self.content {
            MessageContent::Node(node) => node.image_sources(),
            _ => Vec::new(),
        }
    }

    pub fn mark_image_failed(&mut self, src: &str) -> usize {
        match &mut self.content {
            MessageContent::Node(node) => node.mark_image_failed(src),
            _ => 0,
        }
    }
}

pub fn render_user_message(text: &str) -> ChatMessage {
    ChatMessage {
        sender: Sender::User,
        content: MessageContent::Text(Some(text.to_string())),
    }
}

pub fn render_bot_message(text: Option<&str>) -> ChatMessage {
    ChatMessage {
        sender: Sender::Bot,
        content: MessageContent::Text(text.map(str::to_string)),
    }
}

pub fn render_agent_response(response: &AgentResponse) -> ChatMessage {
    match response {
        AgentResponse::Text { message } => render_bot_message(message.as_deref()),
        AgentResponse::MealPlan(plan) => render_meal_plan(plan),
    }
}

pub fn render_meal_plan(plan: &MealPlan) -> ChatMessage {
    let mut children = vec![Node::Paragraph(plan.message.clone())];
    children.extend(plan.meal_plan.iter().map(recipe_card));

    if !plan.shopping_list.is_empty() {
        children.push(shopping_list(&plan.shopping_list));
        children.push(Node::Strong(CART_CALL_TO_ACTION.to_string()));
    }

    ChatMessage {
        sender: Sender::Bot,
        content: MessageContent::Node(Node::group(GroupRole::MealPlan, children)),
    }
}

fn recipe_card(recipe: &Recipe) -> Node {
    let mut children = vec![Node::Heading {
        level: 3,
        text: recipe.name.clone(),
    }];

    if let Some(src) = &recipe.image {
        children.push(Node::Image(Image {
            src: src.clone(),
            alt: recipe.name.clone(),
            hidden: false,
        }));
    }

    if !recipe.ingredients.is_empty() {
        children.push(Node::Heading {
            level: 4,
            text: INGREDIENTS_HEADING.to_string(),
        });
        children.push(Node::group(
            GroupRole::IngredientList,
            vec![Node::List(recipe.ingredients.iter().map(ingredient_line).collect())],
        ));
    }

    Node::group(GroupRole::RecipeCard, children)
}

fn shopping_list(items: &[ShoppingItem]) -> Node {
    Node::group(
        GroupRole::ShoppingList,
        vec![
            Node::Heading {
                level: 4,
                text: SHOPPING_LIST_HEADING.to_string(),
            },
            Node::List(items.iter().map(shopping_line).collect()),
        ],
    )
}

/// `"{measure} {name}"`, without a leading space when the measure is blank.
pub fn ingredient_line(ingredient: &Ingredient) -> String {
    let measure = ingredient.measure.as_deref().unwrap_or("");
    format!("{} {}", measure, ingredient.name).trim().to_string()
}

pub fn shopping_line(item: &ShoppingItem) -> String {
    format!("{} (need {})", item.name, item.needed_display())
}
