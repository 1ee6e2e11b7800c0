pub mod rules; // Keyword tables + generic matcher
pub mod classify; // Communication style, urgency, preferred name
pub mod symptoms;
pub mod stage; // Diagnosis stage progression
pub mod emotion; // Mood tracking + thinking placeholder
pub mod pacing; // Typing delay before bot replies
