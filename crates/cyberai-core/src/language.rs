//! Response-language table used by prompt assembly.

/// Language the templates are written in; no directive is added for it.
pub const DEFAULT_LANGUAGE: &str = "en";

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("hi", "Hindi (हिंदी)"),
    ("es", "Spanish (Español)"),
    ("fr", "French (Français)"),
    ("de", "German (Deutsch)"),
    ("it", "Italian (Italiano)"),
    ("pt", "Portuguese (Português)"),
    ("ru", "Russian (Русский)"),
    ("ja", "Japanese (日本語)"),
    ("ko", "Korean (한국어)"),
    ("zh", "Chinese (中文)"),
    ("ar", "Arabic (العربية)"),
    ("tr", "Turkish (Türkçe)"),
    ("nl", "Dutch (Nederlands)"),
    ("sv", "Swedish (Svenska)"),
    ("no", "Norwegian (Norsk)"),
    ("da", "Danish (Dansk)"),
    ("fi", "Finnish (Suomi)"),
    ("pl", "Polish (Polski)"),
    ("cs", "Czech (Čeština)"),
    ("hu", "Hungarian (Magyar)"),
    ("ro", "Romanian (Română)"),
    ("bg", "Bulgarian (Български)"),
    ("hr", "Croatian (Hrvatski)"),
    ("sk", "Slovak (Slovenčina)"),
    ("sl", "Slovenian (Slovenščina)"),
    ("et", "Estonian (Eesti)"),
    ("lv", "Latvian (Latviešu)"),
    ("lt", "Lithuanian (Lietuvių)"),
    ("mt", "Maltese (Malti)"),
    ("ga", "Irish (Gaeilge)"),
    ("cy", "Welsh (Cymraeg)"),
    ("eu", "Basque (Euskera)"),
    ("ca", "Catalan (Català)"),
    ("gl", "Galician (Galego)"),
    ("th", "Thai (ไทย)"),
    ("vi", "Vietnamese (Tiếng Việt)"),
    ("id", "Indonesian (Bahasa Indonesia)"),
    ("ms", "Malay (Bahasa Melayu)"),
    ("tl", "Filipino (Tagalog)"),
    ("sw", "Swahili (Kiswahili)"),
    ("am", "Amharic (አማርኛ)"),
    ("he", "Hebrew (עברית)"),
    ("fa", "Persian (فارسی)"),
    ("ur", "Urdu (اردو)"),
    ("bn", "Bengali (বাংলা)"),
    ("ta", "Tamil (தமிழ்)"),
    ("te", "Telugu (తెలుగు)"),
    ("ml", "Malayalam (മലയാളം)"),
    ("kn", "Kannada (ಕನ್ನಡ)"),
    ("gu", "Gujarati (ગુજરાતી)"),
    ("pa", "Punjabi (ਪੰਜਾਬੀ)"),
    ("mr", "Marathi (मराठी)"),
    ("ne", "Nepali (नेपाली)"),
    ("si", "Sinhala (සිංහල)"),
    ("my", "Burmese (မြန်မာ)"),
    ("km", "Khmer (ខ្មែរ)"),
    ("lo", "Lao (ລາວ)"),
    ("ka", "Georgian (ქართული)"),
    ("hy", "Armenian (Հայերեն)"),
    ("az", "Azerbaijani (Azərbaycan)"),
    ("kk", "Kazakh (Қазақ)"),
    ("ky", "Kyrgyz (Кыргыз)"),
    ("uz", "Uzbek (Oʻzbek)"),
    ("tg", "Tajik (Тоҷикӣ)"),
    ("mn", "Mongolian (Монгол)"),
    ("bo", "Tibetan (བོད་ཡིག)"),
    ("dz", "Dzongkha (རྫོང་ཁ)"),
    ("is", "Icelandic (Íslenska)"),
    ("fo", "Faroese (Føroyskt)"),
    ("gd", "Scottish Gaelic (Gàidhlig)"),
    ("br", "Breton (Brezhoneg)"),
    ("co", "Corsican (Corsu)"),
    ("sc", "Sardinian (Sardu)"),
    ("rm", "Romansh (Rumantsch)"),
    ("lb", "Luxembourgish (Lëtzebuergesch)"),
    ("af", "Afrikaans"),
    ("zu", "Zulu (isiZulu)"),
    ("xh", "Xhosa (isiXhosa)"),
    ("st", "Sesotho (Sesotho)"),
    ("tn", "Setswana (Setswana)"),
    ("ss", "Swati (siSwati)"),
    ("nr", "Ndebele (isiNdebele)"),
    ("ve", "Venda (Tshivenḓa)"),
    ("ts", "Tsonga (Xitsonga)"),
    ("nso", "Northern Sotho (Sepedi)"),
    ("yo", "Yoruba (Yorùbá)"),
    ("ig", "Igbo (Asụsụ Igbo)"),
    ("ha", "Hausa (Harshen Hausa)"),
    ("ff", "Fulah (Fulfulde)"),
    ("wo", "Wolof"),
    ("sn", "Shona (chiShona)"),
    ("rw", "Kinyarwanda"),
    ("rn", "Kirundi"),
    ("lg", "Luganda"),
    ("ak", "Akan (Twi)"),
    ("ee", "Ewe (Eʋegbe)"),
    ("tw", "Twi"),
    ("bm", "Bambara"),
    ("dyu", "Dyula"),
    ("mos", "Mossi"),
    ("gur", "Frafra"),
    ("dag", "Dagbani"),
];

/// Display name for a language code, e.g. `"fr"` -> `"French (Français)"`.
pub fn language_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    LANGUAGES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Whether `code` names the default template language.
pub fn is_default_language(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(DEFAULT_LANGUAGE)
}

/// All known `(code, name)` pairs.
pub fn languages() -> &'static [(&'static str, &'static str)] {
    LANGUAGES
}
