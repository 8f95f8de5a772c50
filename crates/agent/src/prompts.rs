//! Prompt templates.

use cutify_core::model::{Character, Location, Project, Scene};

pub const SHOWRUNNER_PERSONA: &str = "You are the 'Showrunner Agent', a world-class video producer and creative director for the CUTIFY platform. \
Your goal is to guide the user from an initial vague idea to a concrete video concept. \
You are professional, creative, and encouraging. \
Always ask clarifying questions if the user's request is unclear. \
Keep responses concise and focused on video production.";

/// Persona for project chat, where the model can edit the project.
pub fn project_showrunner(project: &Project, scenes: &[Scene]) -> String {
    let mut prompt = format!(
        "{SHOWRUNNER_PERSONA}\n\n\
         You are working on the project \"{}\".\n\
         Genre: {}\nPitch: {}\nVisual style: {}\nTarget audience: {}\n",
        project.title,
        or_tbd(&project.genre),
        or_tbd(&project.pitch),
        or_tbd(&project.visual_style),
        or_tbd(&project.target_audience),
    );

    if scenes.is_empty() {
        prompt.push_str("\nThe project has no scenes yet.\n");
    } else {
        prompt.push_str("\nCurrent scenes, in order:\n");
        for scene in scenes {
            prompt.push_str(&format!(
                "{}. {} (id {})\n",
                scene.sequence_order, scene.title, scene.id
            ));
        }
    }

    prompt.push_str(
        "\nWhen the user asks to change the project or its scenes, call the matching tool \
         instead of describing the change. Confirm what you did in one or two sentences.",
    );
    prompt
}

pub const CONCEPT_EXTRACTOR: &str = "You are a Video Concept Analyst. Your job is to read a conversation between a user and a Showrunner Agent and extract a structured video concept.
You must output strictly valid JSON and nothing else.
The JSON schema must be:
{
    \"title\": \"string\",
    \"genre\": \"string\",
    \"pitch\": \"string (max 50 words)\",
    \"visual_style\": \"string\",
    \"target_audience\": \"string\"
}
If any field is missing information, infer it or use 'TBD'.";

pub fn concept_extraction(transcript: &str) -> String {
    format!("{CONCEPT_EXTRACTOR}\n\nCHAT HISTORY:\n{transcript}\n\nJSON OUTPUT:")
}

pub fn scene_breakdown(project: &Project, with_cast: bool) -> String {
    let mut prompt = format!(
        "You are an expert Screenwriter. Your job is to take a high-level video concept and break it \
         down into a logical sequence of 5 to 8 distinct scenes.\n\n\
         PROJECT TITLE: {}\nGENRE: {}\nPITCH: {}\nVISUAL STYLE: {}\nTARGET DURATION: {}\nLANGUAGE: {}\n\n",
        project.title,
        or_tbd(&project.genre),
        or_tbd(&project.pitch),
        or_tbd(&project.visual_style),
        project.target_duration,
        project.language,
    );

    if with_cast {
        prompt.push_str(
            "Output STRICT JSON ONLY as an object. Do not include markdown formatting.\n\
             {\n\
             \x20 \"scenes\": [{\"title\": \"string\", \"summary\": \"string (approx 2 sentences describing the action)\", \
             \"estimated_duration\": \"string (e.g. '~30s')\", \"characters\": [\"character name\"], \"location\": \"location name\"}],\n\
             \x20 \"characters\": [{\"name\": \"string\", \"description\": \"string\", \"traits\": \"string\"}],\n\
             \x20 \"locations\": [{\"name\": \"string\", \"description\": \"string\", \"ambiance\": \"string\"}]\n\
             }\n\
             Every character and location a scene mentions must appear in the lists.\n",
        );
    } else {
        prompt.push_str(
            "Output STRICT JSON ONLY as a list of objects. Do not include markdown formatting.\n\
             Each object must have:\n\
             {\"title\": \"string\", \"summary\": \"string (approx 2 sentences describing the action)\", \
             \"estimated_duration\": \"string (e.g. '~30s')\"}\n",
        );
    }

    prompt.push_str("Do not include sequence_order, it will be added programmatically.");
    prompt
}

pub fn scene_script(project: &Project, scene: &Scene) -> String {
    format!(
        "You are an expert Screenwriter. Your job is to write a DETAILED SCRIPT for a specific scene in a video project.\n\n\
         PROJECT CONTEXT:\nTitle: {}\nGenre: {}\nVisual Style: {}\nLanguage: {}\n\n\
         SCENE TO WRITE:\nTitle: {}\nSummary: {}\n\n\
         INSTRUCTIONS:\n\
         - Write a standard screenplay format script.\n\
         - Include Scene Heading (EXT/INT).\n\
         - Include Action Descriptions (Visuals).\n\
         - Include Dialogue (if applicable).\n\
         - Be creative and detailed.\n\
         - Return ONLY the script content.",
        project.title,
        or_tbd(&project.genre),
        or_tbd(&project.visual_style),
        project.language,
        scene.title,
        scene.summary,
    )
}

pub const DEFAULT_STYLE: &str = "Cinematic";
pub const DEFAULT_GENRE: &str = "General";

/// The 3x3 contact sheet prompt.
pub fn storyboard(
    project: &Project,
    scene: &Scene,
    cast: &[Character],
    location: Option<&Location>,
) -> String {
    let style = non_empty(&project.visual_style).unwrap_or(DEFAULT_STYLE);
    let genre = non_empty(&project.genre).unwrap_or(DEFAULT_GENRE);
    let script = scene
        .script
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&scene.summary);

    let mut references = String::new();
    for character in cast {
        references.push_str(&format!("Character: {}", character.name));
        if let Some(traits) = non_empty(&character.traits).or(non_empty(&character.description)) {
            references.push_str(&format!(" ({traits})"));
        }
        references.push('\n');
    }
    if let Some(location) = location {
        references.push_str(&format!("Location: {}", location.name));
        if let Some(ambiance) = non_empty(&location.ambiance).or(non_empty(&location.description)) {
            references.push_str(&format!(" ({ambiance})"));
        }
        references.push('\n');
    }

    format!(
        "<role>\n\
         You are an award-winning trailer director + cinematographer + storyboard artist. Your job: turn ONE scene \
         into a cohesive cinematic short sequence, then output AI-video-ready keyframes.\n\
         </role>\n\n\
         <input>\n\
         Context: {style} / {genre}\n\
         Scene Script: {script}\n\
         {references}\
         </input>\n\n\
         <rules>\n\
         1) First, analyze the full composition: identify ALL key subjects and describe spatial relationships.\n\
         2) Strict continuity across ALL shots: same subjects, same wardrobe, same environment.\n\
         3) Depth of field must be realistic.\n\
         4) Do NOT introduce new characters not present in the script.\n\
         </rules>\n\n\
         <goal>\n\
         Expand the scene into a 9-panel cinematic storyboard (3x3 grid).\n\
         Plan 9 keyframes: shot progression, camera movement, light and color.\n\
         </goal>\n\n\
         <output>\n\
         You MUST output ONE single master image: a Cinematic Contact Sheet / Storyboard Grid containing ALL 9 \
         keyframes in one large image.\n\
         - Grid: 3x3, panels of equal size, no borders or captions.\n\
         - Every keyframe is a separate panel, read left to right, top to bottom.\n\
         - Strict continuity across ALL panels.\n\
         </output>"
    )
}

/// Reference image prompt for a character or a location.
pub fn asset(kind: AssetKind, name: &str, details: &str, style: Option<&str>) -> String {
    let style = style.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("Photorealistic");
    match kind {
        AssetKind::Character => format!(
            "Generate a cinematic portrait image:\n\n\
             Subject: {name}\nDetails: {details}\n\n\
             Requirements:\n\
             - High quality cinematic portrait\n\
             - Professional film still aesthetic\n\
             - Realistic lighting\n\
             - Suitable for a movie character reference\n\
             - 3:4 portrait aspect ratio\n\
             - {style} style\n\n\
             OUTPUT: Generate ONE high-quality portrait image."
        ),
        AssetKind::Location => format!(
            "Generate a cinematic location/scene image:\n\n\
             Location: {name}\nDetails: {details}\n\n\
             Requirements:\n\
             - Cinematic wide shot or establishing shot\n\
             - Professional film still aesthetic\n\
             - Atmospheric lighting\n\
             - Suitable for a movie location reference\n\
             - 16:9 landscape aspect ratio\n\
             - {style} style\n\n\
             OUTPUT: Generate ONE high-quality environment image."
        ),
    }
}

/// What kind of reference image an asset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Character,
    Location,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Location => "location",
        }
    }

    pub fn aspect_ratio(&self) -> &'static str {
        match self {
            Self::Character => "3:4",
            Self::Location => "16:9",
        }
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "character" => Ok(Self::Character),
            "location" => Ok(Self::Location),
            other => Err(format!("unknown asset type '{other}'")),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn or_tbd(value: &Option<String>) -> &str {
    non_empty(value).unwrap_or("TBD")
}
