//! Fixed instruction and response schema sent with every classification.

use serde_json::{Value, json};

/// Instruction describing the analysis and the expected output shape.
pub const CLASSIFICATION_INSTRUCTION: &str = "\
You are a sophisticated medical imaging AI. Analyze this medical scan (e.g., X-ray, MRI) and provide a multi-class classification.
Your primary goal is to identify potential abnormalities.
1. Provide a list of the top 3 most likely conditions, with confidence scores from 0.0 to 1.0. The highest confidence should be first.
2. Generate a Grad-CAM explanation, including a textual summary and a bounding box for the most relevant region that influenced your top prediction.
3. The bounding box coordinates (top, left, width, height) must be percentages of the image's dimensions.
4. Ensure the output is a valid JSON object matching the provided schema.";

/// JSON schema (Gemini `responseSchema` dialect) of the expected answer.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "predictions": {
                "type": "ARRAY",
                "description": "An array of possible classifications, sorted by confidence from high to low.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "class": {
                            "type": "STRING",
                            "description": "The predicted medical condition (e.g., 'Pneumonia', 'Normal', 'Cardiomegaly')."
                        },
                        "confidence": {
                            "type": "NUMBER",
                            "description": "The model's confidence score from 0.0 to 1.0."
                        }
                    },
                    "required": ["class", "confidence"]
                }
            },
            "gradCam": {
                "type": "OBJECT",
                "description": "Details for visualizing the model's attention.",
                "properties": {
                    "explanation": {
                        "type": "STRING",
                        "description": "A brief, user-friendly explanation of what the model focused on in the image."
                    },
                    "focusArea": {
                        "type": "OBJECT",
                        "description": "A bounding box for the primary area of interest as percentages of image dimensions (e.g., top: 25, left: 40, width: 30, height: 30).",
                        "properties": {
                            "top": { "type": "NUMBER" },
                            "left": { "type": "NUMBER" },
                            "width": { "type": "NUMBER" },
                            "height": { "type": "NUMBER" }
                        },
                        "required": ["top", "left", "width", "height"]
                    }
                },
                "required": ["explanation", "focusArea"]
            }
        },
        "required": ["predictions", "gradCam"]
    })
}
