//! English to Portuguese labels for provider data.
//!
//! Weather conditions match case-insensitively, country names exactly. Blank
//! and unknown inputs come back unchanged.

use std::collections::HashMap;

use lazy_static::lazy_static;

const WEATHER_CONDITIONS: &[(&str, &str)] = &[
    ("clear sky", "céu limpo"),
    ("few clouds", "poucas nuvens"),
    ("scattered clouds", "nuvens dispersas"),
    ("broken clouds", "nuvens fragmentadas"),
    ("shower rain", "chuva de banho"),
    ("rain", "chuva"),
    ("thunderstorm", "tempestade"),
    ("snow", "neve"),
    ("mist", "neblina"),
    ("fog", "nevoeiro"),
    ("haze", "nebulosidade"),
    ("dust", "poeira"),
    ("sand", "areia"),
    ("ash", "cinza vulcânica"),
    ("squall", "rajada"),
    ("tornado", "tornado"),
    ("sunny", "ensolarado"),
    ("partly cloudy", "parcialmente nublado"),
    ("cloudy", "nublado"),
    ("overcast", "nublado"),
    ("light rain", "chuva fraca"),
    ("moderate rain", "chuva moderada"),
    ("heavy rain", "chuva forte"),
    ("drizzle", "garoa"),
    ("showers", "pancadas de chuva"),
    ("thundery outbreaks possible", "possíveis tempestades"),
    ("blowing snow", "neve com vento"),
    ("blizzard", "nevasca"),
    ("freezing fog", "nevoeiro congelante"),
    ("patchy rain possible", "possibilidade de chuva"),
    ("patchy snow possible", "possibilidade de neve"),
    ("patchy sleet possible", "possibilidade de granizo"),
    ("patchy freezing drizzle possible", "possibilidade de garoa congelante"),
];

const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("Afghanistan", "Afeganistão"),
    ("Albania", "Albânia"),
    ("Algeria", "Argélia"),
    ("Argentina", "Argentina"),
    ("Armenia", "Armênia"),
    ("Australia", "Austrália"),
    ("Austria", "Áustria"),
    ("Azerbaijan", "Azerbaijão"),
    ("Bahrain", "Bahrein"),
    ("Bangladesh", "Bangladesh"),
    ("Belarus", "Bielorrússia"),
    ("Belgium", "Bélgica"),
    ("Bolivia", "Bolívia"),
    ("Bosnia and Herzegovina", "Bósnia e Herzegovina"),
    ("Brazil", "Brasil"),
    ("Bulgaria", "Bulgária"),
    ("Cambodia", "Camboja"),
    ("Canada", "Canadá"),
    ("Chile", "Chile"),
    ("China", "China"),
    ("Colombia", "Colômbia"),
    ("Croatia", "Croácia"),
    ("Cuba", "Cuba"),
    ("Cyprus", "Chipre"),
    ("Czech Republic", "República Tcheca"),
    ("Denmark", "Dinamarca"),
    ("Ecuador", "Equador"),
    ("Egypt", "Egito"),
    ("Estonia", "Estônia"),
    ("Finland", "Finlândia"),
    ("France", "França"),
    ("Germany", "Alemanha"),
    ("Greece", "Grécia"),
    ("Hungary", "Hungria"),
    ("Iceland", "Islândia"),
    ("India", "Índia"),
    ("Indonesia", "Indonésia"),
    ("Iran", "Irã"),
    ("Iraq", "Iraque"),
    ("Ireland", "Irlanda"),
    ("Israel", "Israel"),
    ("Italy", "Itália"),
    ("Japan", "Japão"),
    ("Jordan", "Jordânia"),
    ("Kazakhstan", "Cazaquistão"),
    ("Kenya", "Quênia"),
    ("Kuwait", "Kuwait"),
    ("Latvia", "Letônia"),
    ("Lebanon", "Líbano"),
    ("Lithuania", "Lituânia"),
    ("Luxembourg", "Luxemburgo"),
    ("Malaysia", "Malásia"),
    ("Mexico", "México"),
    ("Mongolia", "Mongólia"),
    ("Morocco", "Marrocos"),
    ("Netherlands", "Países Baixos"),
    ("New Zealand", "Nova Zelândia"),
    ("Norway", "Noruega"),
    ("Pakistan", "Paquistão"),
    ("Peru", "Peru"),
    ("Philippines", "Filipinas"),
    ("Poland", "Polônia"),
    ("Portugal", "Portugal"),
    ("Qatar", "Catar"),
    ("Romania", "Romênia"),
    ("Russia", "Rússia"),
    ("Saudi Arabia", "Arábia Saudita"),
    ("Serbia", "Sérvia"),
    ("Singapore", "Singapura"),
    ("Slovakia", "Eslováquia"),
    ("Slovenia", "Eslovênia"),
    ("South Africa", "África do Sul"),
    ("South Korea", "Coreia do Sul"),
    ("Spain", "Espanha"),
    ("Sweden", "Suécia"),
    ("Switzerland", "Suíça"),
    ("Thailand", "Tailândia"),
    ("Turkey", "Turquia"),
    ("Ukraine", "Ucrânia"),
    ("United Arab Emirates", "Emirados Árabes Unidos"),
    ("United Kingdom", "Reino Unido"),
    ("United States", "Estados Unidos"),
    ("United States of America", "Estados Unidos da América"),
    ("Uruguay", "Uruguai"),
    ("Venezuela", "Venezuela"),
    ("Vietnam", "Vietnã"),
];

lazy_static! {
    static ref CONDITIONS: HashMap<&'static str, &'static str> =
        WEATHER_CONDITIONS.iter().copied().collect();
    static ref COUNTRIES: HashMap<&'static str, &'static str> =
        COUNTRY_NAMES.iter().copied().collect();
}

pub fn weather_condition(condition: &str) -> String {
    if condition.trim().is_empty() {
        return condition.to_string();
    }
    CONDITIONS
        .get(condition.to_lowercase().as_str())
        .map(|t| t.to_string())
        .unwrap_or_else(|| condition.to_string())
}

pub fn country_name(name: &str) -> String {
    if name.trim().is_empty() {
        return name.to_string();
    }
    COUNTRIES
        .get(name)
        .map(|t| t.to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_conditions_translate_in_any_case() {
        assert_eq!(weather_condition("clear sky"), "céu limpo");
        assert_eq!(weather_condition("Partly cloudy"), "parcialmente nublado");
        assert_eq!(weather_condition("SuNnY"), "ensolarado");
        assert_eq!(weather_condition("thunderstorm"), "tempestade");
    }

    #[test]
    fn country_names_match_exactly() {
        assert_eq!(country_name("Brazil"), "Brasil");
        assert_eq!(country_name("United States"), "Estados Unidos");
        assert_eq!(country_name("Germany"), "Alemanha");
        assert_eq!(country_name("brazil"), "brazil");
    }

    #[test]
    fn unknown_and_blank_pass_through() {
        assert_eq!(weather_condition("unknown condition"), "unknown condition");
        assert_eq!(country_name("Unknown Country"), "Unknown Country");
        assert_eq!(weather_condition(""), "");
        assert_eq!(country_name("   "), "   ");
    }
}
